use std::fs;
use std::path::{Path, PathBuf};

use kmeans_pp::input::load_joined;
use kmeans_pp::lloyd::Refiner;
use kmeans_pp::{
    compute_clustering_with_source, compute_kmeans_pp_clustering, Centers, ClusteringProblem, KMeansError, OptionalParameters, PointSet,
    ScriptedSource, OUTPUT_DECIMALS,
};

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn seeded(seed: u64) -> Option<OptionalParameters> {
    Some(OptionalParameters {
        seed: Some(seed),
        ..Default::default()
    })
}

#[test]
fn joined_tables_are_clustered_and_rendered() {
    let dir = tempfile::tempdir().unwrap();
    // keys out of order; key 9 only on the left, key 7 only on the right
    let left = write(dir.path(), "left.csv", "3,10.0\n1,0.0\n9,55.5\n2,0.0\n\n4,10.0\n");
    let right = write(dir.path(), "right.csv", "1,0.0\n2,1.0\n3,0.0\n4,1.0\n7,3.0\n");

    let space = load_joined(&left, &right).unwrap();
    assert_eq!(
        space.get_positions(),
        vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![10.0, 0.0], vec![10.0, 1.0]]
    );

    // first seed at index 0, second drawn at u = 0.9 -> index 3
    let prob = ClusteringProblem { k: 2, max_iter: 300 };
    let clustering = compute_clustering_with_source(&space, &prob, &mut ScriptedSource::new(vec![0.0, 0.9]), None, None).unwrap();
    assert_eq!(clustering.get_seeds().to_string(), "0,3");
    assert_eq!(clustering.to_string(), "0.0000,0.5000\n10.0000,0.5000");

    let out = dir.path().join("centroids.txt");
    clustering.save_to_file(&out).unwrap();
    assert_eq!(fs::read_to_string(&out).unwrap(), "0.0000,0.5000\n10.0000,0.5000");
}

#[test]
fn four_point_example_splits_for_every_cross_group_seed_pair() {
    let space = PointSet::by_ndpoints(vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![10.0, 0.0], vec![10.0, 1.0]]).unwrap();
    for a in 0..2 {
        for b in 2..4 {
            for (first, second) in [(a, b), (b, a)] {
                let seeds = Centers::new(vec![first, second]);
                let clustering = Refiner::new(&space, seeds.positions(&space), 300, 0.0).unwrap().run(seeds);
                let mut centroids = clustering.rounded_centroids(OUTPUT_DECIMALS);
                centroids.sort_by(|x, y| x[0].partial_cmp(&y[0]).unwrap());
                assert_eq!(centroids, vec![vec![0.0, 0.5], vec![10.0, 0.5]], "seeds {} and {}", first, second);
                assert!(clustering.converged());
            }
        }
    }
}

#[test]
fn four_point_example_with_kmeans_pp() {
    let space = PointSet::by_ndpoints(vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![10.0, 0.0], vec![10.0, 1.0]]).unwrap();
    let prob = ClusteringProblem { k: 2, max_iter: 300 };
    let mut split = 0;
    for seed in 0..50 {
        let (clustering, _) = compute_kmeans_pp_clustering(&space, &prob, seeded(seed)).unwrap();
        let mut centroids = clustering.rounded_centroids(OUTPUT_DECIMALS);
        centroids.sort_by(|x, y| x[0].partial_cmp(&y[0]).unwrap().then(x[1].partial_cmp(&y[1]).unwrap()));
        if centroids == vec![vec![0.0, 0.5], vec![10.0, 0.5]] {
            split += 1;
        } else {
            // the only other fixed point reachable from two seeds of one group
            assert_eq!(centroids, vec![vec![5.0, 0.0], vec![5.0, 1.0]]);
        }
    }
    // the second seed lands in the other group with probability >= 200/202
    assert!(split >= 45, "only {} of 50 runs split the groups", split);
}

#[test]
fn k_one_below_n_has_no_nan() {
    let space = PointSet::by_ndpoints(vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0], vec![5.0, 5.0], vec![9.0, 1.0]]).unwrap();
    let prob = ClusteringProblem { k: 4, max_iter: 50 };
    for seed in 0..10 {
        let (clustering, _) = compute_kmeans_pp_clustering(&space, &prob, seeded(seed)).unwrap();
        assert!(clustering.get_centroids().iter().flatten().all(|x| x.is_finite()));
        assert!(!clustering.to_string().contains("NaN"));
        assert_eq!(clustering.to_string().lines().count(), 4);
    }
}

#[test]
fn loader_errors_name_file_and_line() {
    let dir = tempfile::tempdir().unwrap();
    let left = write(dir.path(), "left.csv", "1,0.0\n2,abc\n");
    let right = write(dir.path(), "right.csv", "1,0.0\n");
    match load_joined(&left, &right) {
        Err(KMeansError::Parse { path, line, .. }) => {
            assert!(path.ends_with("left.csv"));
            assert_eq!(line, 2);
        }
        other => panic!("expected a parse error, got {:?}", other),
    }

    let missing = dir.path().join("missing.csv");
    assert!(matches!(load_joined(&missing, &right), Err(KMeansError::Io(_))));
}
