//! Report rendering and the optional raw histogram dump.

use std::{io::Write, path::Path};

use anyhow::{Context, Result};

use crate::{
    data::MAX_RATING,
    stats::{Histogram, Merged, TagStats},
};

pub const DEFAULT_MAX_WIDTH: usize = 70;

/// Tag table in rank order, one `mean±stdev tag: ranked/total` line
/// per tag clearing the minimum ranked threshold.
pub fn write_tag_table(
    out: &mut impl Write,
    stats: &[TagStats],
    min_ranked: u64,
) -> Result<()> {
    for t in stats.iter().filter(|t| t.stats.ranked >= min_ranked) {
        writeln!(
            out,
            "{} {}: {}/{}",
            t.stats.rating, t.tag, t.stats.ranked, t.stats.total
        )?;
    }
    Ok(())
}

/// Proportional bar chart of the ranked buckets followed by the
/// `ranked:` and `average:` summary lines.
pub fn write_histogram(
    out: &mut impl Write,
    hist: &Histogram,
    max_width: usize,
) -> Result<()> {
    let max_ranked = hist.max_ranked().max(1);
    for rating in 1..=MAX_RATING {
        let n = hist.count(rating);
        let len = (n as f64 / max_ranked as f64 * max_width as f64)
            .round() as usize;
        let pad = if len > 0 { " " } else { "" };
        writeln!(out, "{:>2}: {}{}{}", rating, "#".repeat(len), pad, n)?;
    }

    let stats = hist.stats();
    writeln!(out, "ranked: {}/{}", stats.ranked, stats.total)?;
    writeln!(out, "average: {:.2}", stats.rating.mean)?;
    Ok(())
}

/// Flat dump of the raw histogram counts: first the overall
/// histogram under an empty quoted name, then one line per merged
/// tag record. Every tag goes in, threshold or not.
pub fn write_dump(out: &mut impl Write, merged: &Merged) -> Result<()> {
    write_dump_line(out, "", &merged.overall)?;
    for rec in merged.tags.values() {
        write_dump_line(out, &rec.display, &rec.hist)?;
    }
    Ok(())
}

fn write_dump_line(
    out: &mut impl Write,
    name: &str,
    hist: &Histogram,
) -> Result<()> {
    write!(out, "{name:?}")?;
    for n in hist.counts() {
        write!(out, ", {n}")?;
    }
    writeln!(out)?;
    Ok(())
}

pub fn dump_to_file(path: &Path, merged: &Merged) -> Result<()> {
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("failed to create dump file {path:?}"))?;
    write_dump(&mut file, merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{data::Item, stats::Aggregator};

    fn merged_fixture() -> Merged {
        let mut agg = Aggregator::default();
        for (score, tags) in [
            (8, vec!["x"]),
            (6, vec!["x", "y"]),
            (6, vec!["x"]),
            (0, vec!["z"]),
        ] {
            agg.accumulate(&Item {
                score,
                tags: tags.into_iter().map(String::from).collect(),
            });
        }
        agg.merge_variants()
    }

    fn render<F: FnOnce(&mut Vec<u8>)>(f: F) -> String {
        let mut buf = Vec::new();
        f(&mut buf);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn tag_table_format_and_threshold() {
        let merged = merged_fixture();
        let stats = merged.tag_stats();

        let all = render(|buf| {
            write_tag_table(buf, &stats, 1).unwrap();
        });
        assert_eq!(all, "6.67±0.94 x: 3/3\n6.00±0.00 y: 1/1\n");

        let strict = render(|buf| {
            write_tag_table(buf, &stats, 2).unwrap();
        });
        assert_eq!(strict, "6.67±0.94 x: 3/3\n");

        // With the threshold off even the never-ranked tag shows,
        // NaN stats and all, at the bottom.
        let loose = render(|buf| {
            write_tag_table(buf, &stats, 0).unwrap();
        });
        assert!(loose.ends_with("NaN±NaN z: 0/1\n"));
    }

    #[test]
    fn histogram_chart_format() {
        let merged = merged_fixture();
        let out = render(|buf| {
            write_histogram(buf, &merged.overall, 10).unwrap();
        });
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 12);
        assert_eq!(lines[0], " 1: 0");
        assert_eq!(lines[5], " 6: ########## 2");
        assert_eq!(lines[7], " 8: ##### 1");
        assert_eq!(lines[10], "ranked: 3/4");
        assert_eq!(lines[11], "average: 6.67");
    }

    #[test]
    fn histogram_chart_of_empty_run() {
        let out = render(|buf| {
            write_histogram(buf, &Histogram::default(), 10).unwrap();
        });
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], " 1: 0");
        assert_eq!(lines[10], "ranked: 0/0");
        assert_eq!(lines[11], "average: NaN");
    }

    #[test]
    fn dump_format() {
        let merged = merged_fixture();
        let out = render(|buf| {
            write_dump(buf, &merged).unwrap();
        });
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "\"\", 1, 0, 0, 0, 0, 0, 2, 0, 1, 0, 0");
        assert_eq!(lines[1], "\"x\", 0, 0, 0, 0, 0, 0, 2, 0, 1, 0, 0");
        assert_eq!(lines[2], "\"y\", 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0");
        // Below-threshold tags still land in the dump.
        assert_eq!(lines[3], "\"z\", 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0");
    }

    #[test]
    fn dump_to_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.txt");
        let merged = merged_fixture();
        dump_to_file(&path, &merged).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1 + merged.tags.len());
        assert!(content.starts_with("\"\", 1,"));
    }
}
