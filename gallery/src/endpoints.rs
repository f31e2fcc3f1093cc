//! URL builders for the `/assets_plus` HTTP surface.

use crate::feed::{PageRequest, PollRequest};
use crate::model::Root;

pub const API_PREFIX: &str = "/assets_plus";

/// Base-aware URL builder. `base` is the origin the panel talks to, empty
/// when served from the same host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Endpoints {
    base: String,
}

impl Endpoints {
    pub fn new(base: impl Into<String>) -> Self {
        let mut base = base.into();
        while base.ends_with('/') {
            base.pop();
        }
        Self { base }
    }

    fn path(&self, tail: &str) -> String {
        format!("{}{}{}", self.base, API_PREFIX, tail)
    }

    /// `recursive` is the panel's effective flag; a server-side `scan_depth`
    /// still takes precedence over it.
    pub fn page(&self, root: Root, req: &PageRequest, recursive: bool) -> String {
        let mut url = self.path(&format!("/{}/list?limit={}&recursive={}", root, req.limit, recursive));
        if let Some(cursor) = &req.cursor {
            url.push_str("&cursor=");
            url.push_str(&urlencoding::encode(&cursor.to_string()));
        }
        url
    }

    pub fn poll(&self, root: Root, req: &PollRequest, recursive: bool) -> String {
        self.path(&format!("/{}/list?since={}&limit={}&recursive={}", root, req.since, req.limit, recursive))
    }

    /// `mtime` busts the browser cache when a file is overwritten in place.
    pub fn thumb(&self, root: Root, relpath: &str, size: (u32, u32), mtime: i64) -> String {
        self.path(&format!(
            "/{}/thumb?relpath={}&w={}&h={}&v={}",
            root,
            urlencoding::encode(relpath),
            size.0,
            size.1,
            mtime
        ))
    }

    pub fn file(&self, root: Root, relpath: &str) -> String {
        self.path(&format!("/{}/file?relpath={}", root, urlencoding::encode(relpath)))
    }

    pub fn meta(&self, root: Root, relpath: &str) -> String {
        self.path(&format!("/{}/meta?relpath={}", root, urlencoding::encode(relpath)))
    }

    pub fn delete(&self, root: Root) -> String {
        self.path(&format!("/{}/delete", root))
    }

    pub fn config(&self) -> String {
        self.path("/config")
    }

    pub fn i18n(&self, locale: &str) -> String {
        self.path(&format!("/i18n?locale={}", urlencoding::encode(locale)))
    }

    pub fn thumb_clear(&self) -> String {
        self.path("/thumb/clear")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PageCursor;

    #[test]
    fn trailing_slashes_are_trimmed() {
        assert_eq!(Endpoints::new("http://h:8188//").config(), "http://h:8188/assets_plus/config");
        assert_eq!(Endpoints::default().delete(Root::Input), "/assets_plus/input/delete");
    }

    #[test]
    fn relpaths_and_cursors_are_encoded() {
        let ep = Endpoints::default();
        assert_eq!(
            ep.file(Root::Output, "sub dir/a&b.png"),
            "/assets_plus/output/file?relpath=sub%20dir%2Fa%26b.png"
        );
        let req = PageRequest {
            cursor: Some(PageCursor { mtime: 12, relpath: "x y.png".into() }),
            limit: 50,
        };
        assert_eq!(
            ep.page(Root::Output, &req, true),
            "/assets_plus/output/list?limit=50&recursive=true&cursor=12%3Ax%20y.png"
        );
        assert_eq!(
            ep.poll(Root::Output, &PollRequest { since: 7, limit: 50 }, true),
            "/assets_plus/output/list?since=7&limit=50&recursive=true"
        );
    }

    #[test]
    fn list_urls_carry_the_recursive_flag() {
        let ep = Endpoints::default();
        let first = PageRequest { cursor: None, limit: 20 };
        assert_eq!(ep.page(Root::Input, &first, false), "/assets_plus/input/list?limit=20&recursive=false");
        assert_eq!(
            ep.poll(Root::Input, &PollRequest { since: 3, limit: 20 }, false),
            "/assets_plus/input/list?since=3&limit=20&recursive=false"
        );
    }

    #[test]
    fn thumb_carries_size_and_version() {
        let url = Endpoints::default().thumb(Root::Input, "a.png", (256, 256), 99);
        assert_eq!(url, "/assets_plus/input/thumb?relpath=a.png&w=256&h=256&v=99");
    }
}
