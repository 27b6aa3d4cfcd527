//! Performance benchmarks for lead-scrape.
//!
//! Run with: `cargo bench`
//!
//! Covers the hot paths: snapshot parsing + row extraction over listings
//! of increasing size, the email deobfuscation ladder, and CSV assembly.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lead_scrape::email::deobfuscate;
use lead_scrape::{csv, dom, locate, ScrapeOptions};

fn listing_html(rows: usize) -> String {
    let mut body = String::from("<html><body><table><tbody>");
    for i in 0..rows {
        body.push_str(&format!(
            "<tr>\
             <td><a href=\"#/people/p{i}\">Person Num{i}</a></td>\
             <td><span class=\"job-title\">VP of Engineering</span></td>\
             <td><a href=\"#/organizations/{i}\">Company {i}</a></td>\
             <td><a href=\"https://linkedin.com/in/person{i}\">in</a></td>\
             <td><button>Austin, United States</button></td>\
             <td><button aria-label=\"Access email for Person Num{i}\">Access email</button></td>\
             </tr>"
        ));
    }
    body.push_str("</tbody></table></body></html>");
    body
}

fn bench_extraction(c: &mut Criterion) {
    let options = ScrapeOptions::default();
    let mut group = c.benchmark_group("extract_records");
    for rows in [10usize, 25, 100] {
        let html = listing_html(rows);
        group.throughput(Throughput::Bytes(html.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &html, |b, html| {
            b.iter(|| {
                let doc = dom::parse(black_box(html));
                black_box(locate::extract_records(&doc, &options))
            });
        });
    }
    group.finish();
}

fn bench_deobfuscation(c: &mut Criterion) {
    let inputs = [
        ("direct", "jane.doe@acme.org"),
        ("base64", "amFuZUBhY21lLm9yZw=="),
        ("percent", "jane%40acme.org"),
        ("spelled", "jane [at] acme [dot] org"),
        ("noise", "Access email"),
    ];
    let mut group = c.benchmark_group("deobfuscate");
    for (name, input) in inputs {
        group.bench_with_input(BenchmarkId::from_parameter(name), input, |b, input| {
            b.iter(|| black_box(deobfuscate::deobfuscate(black_box(input))));
        });
    }
    group.finish();
}

fn bench_csv(c: &mut Criterion) {
    let options = ScrapeOptions::default();
    let doc = dom::parse(&listing_html(100));
    let records = locate::extract_records(&doc, &options);
    c.bench_function("build_csv_100", |b| {
        b.iter(|| black_box(csv::build_csv(black_box(&records), &options)));
    });
}

criterion_group!(benches, bench_extraction, bench_deobfuscation, bench_csv);
criterion_main!(benches);
