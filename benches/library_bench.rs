use assets_plus::hidden::HiddenIndex;
use assets_plus::library::{page, scan, ScanOptions};
use assets_plus::metadata::WorkflowProbe;
use assets_plus::types::{PageCursor, Root};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::fs;
use std::hint::black_box;
use std::path::Path;
use tempfile::TempDir;

const EXTENSIONS: [&str; 4] = [".png", ".jpg", ".webp", ".mp4"];

fn create_output_tree(depth: usize, files_per_dir: usize, dirs_per_level: usize) -> TempDir {
    let temp_dir = TempDir::new().unwrap();

    fn create_level(path: &Path, current_depth: usize, max_depth: usize, files_per_dir: usize, dirs_per_level: usize) {
        if current_depth >= max_depth {
            return;
        }

        // Mix aus Bildern, Videos und Fremddateien
        for i in 0..files_per_dir {
            let ext = match i % 5 {
                0 => "png",
                1 => "jpg",
                2 => "webp",
                3 => "mp4",
                _ => "txt",
            };
            fs::write(path.join(format!("gen_{:05}.{}", i, ext)), b"not decoded").unwrap();
        }

        for i in 0..dirs_per_level {
            let dir_path = path.join(format!("batch_{}", i));
            fs::create_dir(&dir_path).unwrap();
            create_level(&dir_path, current_depth + 1, max_depth, files_per_dir, dirs_per_level);
        }
    }

    create_level(temp_dir.path(), 0, depth, files_per_dir, dirs_per_level);
    temp_dir
}

fn options(recursive: bool, scan_depth: Option<u32>) -> ScanOptions {
    ScanOptions { extensions: EXTENSIONS.iter().map(|e| e.to_string()).collect(), recursive, scan_depth }
}

fn benchmark_scan(c: &mut Criterion) {
    let tree = create_output_tree(3, 200, 4);
    let hidden = HiddenIndex::default();
    let probe = WorkflowProbe::default();

    let mut group = c.benchmark_group("scan_output");
    for (label, opts) in [
        ("flat", options(false, None)),
        ("depth_1", options(true, Some(1))),
        ("recursive", options(true, None)),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(label), &opts, |b, opts| {
            b.iter(|| black_box(scan(Root::Output, tree.path(), opts, &hidden, &probe).unwrap()))
        });
    }
    group.finish();
}

fn benchmark_page(c: &mut Criterion) {
    let tree = create_output_tree(3, 200, 4);
    let items = scan(Root::Output, tree.path(), &options(true, None), &HiddenIndex::default(), &WorkflowProbe::default())
        .unwrap();
    let middle = &items[items.len() / 2];
    let cursor = PageCursor { mtime: middle.mtime, relpath: middle.relpath.clone() };

    let mut group = c.benchmark_group("page");
    group.bench_function("first_page", |b| b.iter(|| black_box(page(&items, None, None, 500))));
    group.bench_function("cursor_page", |b| b.iter(|| black_box(page(&items, Some(&cursor), None, 500))));
    group.bench_function("poll", |b| b.iter(|| black_box(page(&items, None, Some(middle.mtime), 5000))));
    group.finish();
}

criterion_group!(benches, benchmark_scan, benchmark_page);
criterion_main!(benches);
