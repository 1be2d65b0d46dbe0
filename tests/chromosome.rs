use std::collections::BTreeSet;
use std::io::Write;

use pretty_assertions::assert_eq;
use rstest::rstest;
use tempfile::NamedTempFile;

use tadcrm::{
    AttachRequest, Centromere, Chromosome, ChromosomeOptions, ContactMatrix, DataSource, Error, Experiment, Tad,
    TadSet,
};

fn tads(bounds: &[(usize, usize, f64)]) -> TadSet {
    bounds.iter().map(|&(s, e, score)| Tad::new(s, e, score)).collect()
}

fn matrix_with_empty_rows(size: usize, empty: &[usize]) -> ContactMatrix {
    let rows = (0..size)
        .map(|r| vec![if empty.contains(&r) { 0.0 } else { 1.0 }; size])
        .collect();
    ContactMatrix::from_rows(rows).unwrap()
}

fn covered(tads: &TadSet) -> BTreeSet<usize> {
    tads.iter().flat_map(|t| t.start..t.end).collect()
}

fn assert_sign_invariant(crm: &Chromosome) {
    for xpr in crm.experiments() {
        for tad in &xpr.tads {
            let oversized = crm
                .max_tad_size()
                .is_some_and(|max| tad.width() as u64 * xpr.resolution > max);
            assert_eq!(tad.score < 0.0, oversized, "{:?} in {}", tad, xpr.name);
        }
    }
}

#[test]
fn oversized_tad_is_flagged_and_forbidden() {
    let mut crm = Chromosome::new("1", ChromosomeOptions::default().max_tad_size(3));
    let xpr = Experiment::new("x", 1).with_tads(tads(&[(0, 5, 2.0)]));
    crm.attach_experiment(xpr.into(), false).unwrap();

    assert_eq!(crm.get_experiment("x").unwrap().tads.get(1).unwrap().score, -2.0);
    for bin in 0..5 {
        assert!(crm.forbidden().contains(bin));
    }
    assert_sign_invariant(&crm);
}

#[test]
fn forbidden_regions_intersect_across_experiments() {
    let mut crm = Chromosome::new("1", ChromosomeOptions::default().max_tad_size(1));
    // [1, 3] and [2, 4] are oversized, everything else is one bin long
    let a = Experiment::new("a", 1).with_tads(tads(&[(0, 1, 1.0), (1, 3, 1.0), (3, 4, 1.0)]));
    let b = Experiment::new("b", 1).with_tads(tads(&[(0, 1, 1.0), (1, 2, 1.0), (2, 4, 1.0)]));

    crm.attach_experiment(a.into(), false).unwrap();
    assert_eq!(crm.forbidden().bins().collect::<Vec<_>>(), vec![1, 2, 3]);

    crm.attach_experiment(b.into(), false).unwrap();
    assert_eq!(crm.forbidden().bins().collect::<Vec<_>>(), vec![2, 3]);
    assert_sign_invariant(&crm);
}

#[test]
fn centromere_splits_straddling_tad() {
    let mut crm = Chromosome::new("1", ChromosomeOptions::default().centromere_search(true));
    let xpr = Experiment::new("x", 1)
        .with_tads(tads(&[(0, 6, 1.0)]))
        .with_hic_data(matrix_with_empty_rows(6, &[2, 3]));
    let before = covered(&xpr.tads);
    crm.attach_experiment(xpr.into(), false).unwrap();

    let cen = crm.centromere().unwrap();
    assert_eq!(cen, Centromere::new(2, 4));

    let after = &crm.get_experiment("x").unwrap().tads;
    assert_eq!(after.iter().map(|t| (t.start, t.end)).collect::<Vec<_>>(), vec![(0, 2), (4, 6)]);

    let mut restored = covered(after);
    restored.extend(cen.bins());
    assert_eq!(restored, before);
}

#[rstest]
// straddle
#[case(&[(0, 6, 1.0)], 6, &[2, 3], &[(0, 2), (4, 6)])]
// start-aligned
#[case(&[(0, 2, 1.0), (2, 6, 1.0)], 6, &[2, 3], &[(0, 2), (4, 6)])]
// end-aligned
#[case(&[(0, 4, 1.0), (4, 8, 1.0)], 8, &[2, 3], &[(0, 2), (2, 4), (4, 8)])]
fn splitting_preserves_coverage_and_signs(
    #[case] records: &[(usize, usize, f64)],
    #[case] side: usize,
    #[case] empty: &[usize],
    #[case] expected: &[(usize, usize)],
) {
    let mut crm = Chromosome::new(
        "1",
        ChromosomeOptions::default().centromere_search(true).max_tad_size(3),
    );
    let xpr = Experiment::new("x", 1)
        .with_tads(tads(records))
        .with_hic_data(matrix_with_empty_rows(side, empty));
    let before = covered(&xpr.tads);
    crm.attach_experiment(xpr.into(), false).unwrap();

    let cen = crm.centromere().unwrap();
    let after = &crm.get_experiment("x").unwrap().tads;
    assert_eq!(after.iter().map(|t| (t.start, t.end)).collect::<Vec<_>>(), expected);

    let mut restored = covered(after);
    restored.extend(cen.bins());
    assert_eq!(restored, before);
    assert_sign_invariant(&crm);
}

#[test]
fn disjoint_centromere_estimates_keep_first_interval() {
    let mut crm = Chromosome::new("1", ChromosomeOptions::default().centromere_search(true));
    let a = Experiment::new("a", 1)
        .with_tads(tads(&[(0, 2, 1.0), (4, 10, 1.0)]))
        .with_hic_data(matrix_with_empty_rows(10, &[2, 3]));
    let b = Experiment::new("b", 1)
        .with_tads(tads(&[(0, 6, 1.0), (6, 10, 1.0)]))
        .with_hic_data(matrix_with_empty_rows(10, &[6, 7]));

    crm.attach_experiment(a.into(), false).unwrap();
    crm.attach_experiment(b.into(), false).unwrap();

    assert_eq!(crm.centromere(), Some(Centromere::new(2, 4)));
    let b = &crm.get_experiment("b").unwrap().tads;
    assert_eq!(
        b.iter().map(|t| (t.start, t.end)).collect::<Vec<_>>(),
        vec![(0, 2), (4, 6), (6, 10)]
    );
    for pair in b.iter().collect::<Vec<_>>().windows(2) {
        assert!(pair[0].end <= pair[1].start, "overlapping TADs {:?}", pair);
    }
    assert!(crm.forbidden().contains(2));
    assert!(crm.forbidden().contains(3));
}

#[test]
fn replacing_experiment_keeps_position_and_recomputes() {
    let mut crm = Chromosome::new("1", ChromosomeOptions::default().max_tad_size(3));
    crm.attach_experiment(Experiment::new("a", 1).with_tads(tads(&[(0, 5, 2.0)])).into(), false)
        .unwrap();
    crm.attach_experiment(
        Experiment::new("b", 1).with_tads(tads(&[(0, 1, 1.0), (1, 6, 1.0)])).into(),
        false,
    )
    .unwrap();
    assert_eq!(crm.forbidden().bins().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);

    let replacement = Experiment::new("a", 1).with_tads(tads(&[(0, 2, 1.0), (2, 6, 4.0)]));
    let pos = crm.attach_experiment(replacement.into(), true).unwrap();

    assert_eq!(pos, 0);
    assert_eq!(crm.experiments().len(), 2);
    assert_eq!(crm.experiment_at(0).unwrap().tads.get(2).unwrap().score, -4.0);
    assert_eq!(crm.forbidden().bins().collect::<Vec<_>>(), vec![2, 3, 4, 5]);
    assert_sign_invariant(&crm);
}

#[test]
fn lowering_max_tad_size_flags_and_forbids() {
    let mut crm = Chromosome::new("1", ChromosomeOptions::default().max_tad_size(10));
    let mut records = tads(&[(0, 5, 2.0), (5, 7, 1.0)]);
    records.get_mut(1).unwrap().brk = 4;
    crm.attach_experiment(Experiment::new("x", 1).with_tads(records).into(), false)
        .unwrap();
    assert!(crm.forbidden().is_empty());
    assert_eq!(crm.relative_size().get(), 7);

    crm.set_max_tad_size(Some(3));

    let tad = crm.get_experiment("x").unwrap().tads.get(1).unwrap();
    assert_eq!(tad.score, -2.0);
    assert_eq!(tad.brk, 5);
    assert_eq!(crm.forbidden().bins().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4, 5]);
    assert_eq!(crm.relative_size().get(), 1);
    assert_sign_invariant(&crm);
}

#[test]
fn removed_experiment_is_gone() {
    let mut crm = Chromosome::new("1", ChromosomeOptions::default().max_tad_size(3));
    crm.attach_experiment(Experiment::new("a", 1).with_tads(tads(&[(0, 5, 2.0)])).into(), false)
        .unwrap();
    crm.attach_experiment(Experiment::new("b", 1).with_tads(tads(&[(0, 5, 2.0)])).into(), false)
        .unwrap();
    let forbidden = crm.forbidden().clone();

    let removed = crm.remove_experiment("a").unwrap();
    assert_eq!(removed.name, "a");
    assert!(matches!(crm.get_experiment("a"), Err(Error::ExperimentNotFound(_))));
    assert_eq!(crm.experiment_at(0).map(|x| x.name.as_str()), Some("b"));
    assert_eq!(crm.forbidden(), &forbidden);
    assert!(matches!(crm.remove_experiment("a"), Err(Error::ExperimentNotFound(_))));
}

#[test]
fn explicit_length_is_never_updated() {
    let mut crm = Chromosome::new("1", ChromosomeOptions::default().chr_len(1000));
    let xpr = Experiment::new("x", 100).with_tads(tads(&[(0, 5, 1.0), (5, 40, 1.0)]));
    crm.attach_experiment(xpr.into(), false).unwrap();

    assert_eq!(crm.size().get(), 1000);
}

#[rstest]
#[case(vec![vec![2, 3, 4, 5, 6, 7], vec![3, 4, 5, 6], vec![1, 2, 3, 4, 5, 6, 7, 8], vec![4, 5]])]
#[case(vec![vec![4, 5], vec![2, 3, 4, 5, 6, 7]])]
fn centromere_narrows_monotonically(#[case] empty_rows: Vec<Vec<usize>>) {
    let mut crm = Chromosome::new(
        "1",
        ChromosomeOptions::default().centromere_search(true).max_tad_size(6),
    );
    let mut last: Option<Centromere> = None;

    for (i, empty) in empty_rows.iter().enumerate() {
        let xpr = Experiment::new(format!("x{}", i), 1)
            .with_tads(tads(&[(0, 3, 1.0), (3, 12, 1.0)]))
            .with_hic_data(matrix_with_empty_rows(12, empty));
        crm.attach_experiment(xpr.into(), false).unwrap();

        let cen = crm.centromere().unwrap();
        if let Some(prev) = last {
            assert!(cen.begin >= prev.begin);
            assert!(cen.end <= prev.end);
        }
        for bin in cen.bins() {
            assert!(crm.forbidden().contains(bin));
        }
        last = Some(cen);
    }
    assert_sign_invariant(&crm);
}

#[test]
fn unknown_experiment_is_not_found() {
    let crm = Chromosome::new("1", ChromosomeOptions::default());
    assert!(matches!(crm.get_experiment("nope"), Err(Error::ExperimentNotFound(_))));
    assert!(matches!(crm.tad_borders("nope"), Err(Error::ExperimentNotFound(_))));
}

#[test]
fn experiments_load_from_files() {
    let mut tad_file = NamedTempFile::new().unwrap();
    write!(tad_file, "#\tstart\tend\tscore\n1\t0\t2\t3\n2\t2\t6\t5\n").unwrap();
    let mut hic_file = NamedTempFile::new().unwrap();
    write!(
        hic_file,
        "b1\tb2\tb3\tb4\tb5\tb6\n\
         b1\t1\t1\t0\t0\t1\t1\n\
         b2\t1\t1\t0\t0\t1\t1\n\
         b3\t0\t0\t0\t0\t0\t0\n\
         b4\t0\t0\t0\t0\t0\t0\n\
         b5\t1\t1\t0\t0\t1\t1\n\
         b6\t1\t1\t0\t0\t1\t1\n"
    )
    .unwrap();

    let request = AttachRequest::ByPath {
        name: Some("x".into()),
        resolution: Some(10),
        source: DataSource {
            tads: Some(tad_file.path().to_path_buf()),
            hic: Some(hic_file.path().to_path_buf()),
            norm: None,
        },
    };
    let crm = Chromosome::with_experiments(
        "1",
        ChromosomeOptions::default().centromere_search(true),
        [request],
    )
    .unwrap();

    assert_eq!(crm.centromere(), Some(Centromere::new(2, 4)));
    // start-aligned TAD is pushed past the centromere
    let xpr = crm.get_experiment("x").unwrap();
    assert_eq!(xpr.tads.get(2).map(|t| (t.start, t.end)), Some((4, 6)));
    assert_eq!(crm.size().get(), 60);
    assert_eq!(crm.relative_size().get(), 40);
}
