use overlap::*;

fn label(id: IndexId, name: &str) -> IndexLabel {
    IndexLabel {
        id,
        display_name: name.to_owned(),
    }
}

fn memberships(sets: &[(IndexId, Vec<&'static str>)]) -> Vec<(IndexId, &'static str)> {
    sets.iter()
        .flat_map(|(id, tickers)| tickers.iter().map(move |t| (*id, *t)))
        .collect()
}

#[test]
fn test_three_nested_indices() {
    let selection = vec![label(1, "A"), label(2, "B"), label(3, "C")];
    let ms = memberships(&[(1, vec!["X", "Y", "Z"]), (2, vec!["Y", "Z"]), (3, vec!["Z"])]);
    let r = analyze(&selection, ms);

    let rows: Vec<(&str, usize)> = r
        .commonality
        .iter()
        .map(|c| (c.stock.as_str(), c.appears_in))
        .collect();
    assert_eq!(vec![("Z", 3), ("Y", 2), ("X", 1)], rows);
    assert_eq!(vec!["A", "B", "C"], r.commonality[0].indices);
    assert_eq!(vec!["A", "B"], r.commonality[1].indices);
    assert_eq!(3, r.summary.total_unique_stocks);
    assert_eq!(2.0, r.summary.avg_overlap);
    assert_eq!(1, r.summary.high_overlap_stocks);
}

#[test]
fn test_summary_invariants_over_selections() {
    let all = vec![
        label(1, "A"),
        label(2, "B"),
        label(3, "C"),
        label(4, "D"),
    ];
    let ms = memberships(&[
        (1, vec!["P", "Q", "R", "S"]),
        (2, vec!["Q", "R", "T"]),
        (3, vec!["R", "T", "U", "V"]),
        (4, vec!["R", "S", "V"]),
    ]);
    // every non-empty subset of the four indices
    for mask in 1..16u32 {
        let selection: Vec<IndexLabel> = all
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, l)| l.clone())
            .collect();
        let r = analyze(&selection, ms.iter().cloned());
        for c in &r.commonality {
            assert!(c.appears_in <= selection.len());
            assert_eq!(c.appears_in, c.indices.len());
        }
        assert!(r.summary.high_overlap_stocks <= r.summary.total_unique_stocks);
        assert!(r.summary.avg_overlap <= selection.len() as f64);
        for w in r.commonality.windows(2) {
            assert!(
                w[0].appears_in > w[1].appears_in
                    || (w[0].appears_in == w[1].appears_in && w[0].stock < w[1].stock)
            );
        }
    }
}

#[test]
fn test_unknown_memberships_ignored() {
    let r = analyze(&[label(7, "G")], vec![(8, "X"), (9, "Y")]);
    assert_eq!(vec!["G"], r.analysis_of);
    assert!(r.commonality.is_empty());
    assert_eq!(AnalysisSummary::default(), r.summary);
}
