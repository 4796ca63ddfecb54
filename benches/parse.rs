use std::{fmt::Write, path::PathBuf};

use divan::{Bencher, black_box};
use quill::{Article, repository::ArticleRepository, store::StaticFileRepository};

fn main() {
    divan::main();
}

fn sample(index: usize, paragraphs: usize) -> String {
    let mut raw = format!(
        "<!--\nTitle: Post number {index}\nAuthor: Bench\nPublished: 2015-02-{:02} 15:00\nTags: rust bench web\n-->\n",
        index % 28 + 1
    );
    for paragraph in 0..paragraphs {
        writeln!(raw, "<p>Paragraph {paragraph} of post {index}.</p>").unwrap();
    }
    raw
}

#[divan::bench(args = [1, 100, 10_000])]
fn parse_article(bencher: Bencher, paragraphs: usize) {
    let raw = sample(0, paragraphs);
    bencher.bench(|| Article::parse(black_box(&raw), "post").unwrap());
}

struct Fixture {
    _dir: tempfile::TempDir,
    path: PathBuf,
}

fn fixture(count: usize) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    for index in 0..count {
        std::fs::write(dir.path().join(format!("post-{index}.html")), sample(index, 20)).unwrap();
    }
    let path = dir.path().to_path_buf();
    Fixture { _dir: dir, path }
}

#[divan::bench(args = [10, 500])]
fn load_directory(bencher: Bencher, count: usize) {
    let fixture = fixture(count);
    let runtime = tokio::runtime::Runtime::new().unwrap();
    bencher.bench(|| {
        runtime
            .block_on(StaticFileRepository::open(&fixture.path).all_sorted_by_date())
            .unwrap()
    });
}
