//! Property-based tests for xgp-evo
//!
//! Uses proptest to verify invariants and properties of the library.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use xgp_evo::dataset::sample_indices;
use xgp_evo::prelude::*;

fn generator(n_features: usize, min_height: usize, max_height: usize) -> TreeGenerator {
    TreeGenerator::new(
        FunctionSet::parse("add,sub,mul,div,cos,sin,min,max,neg").unwrap(),
        n_features,
    )
    .heights(min_height, max_height)
}

fn dataset(n_features: usize) -> Dataset {
    let rows: Vec<Vec<f64>> = (0..12)
        .map(|i| (0..n_features).map(|j| (i * (j + 1)) as f64 / 5.0 - 1.0).collect())
        .collect();
    let y = (0..12).map(|i| i as f64).collect();
    Dataset::from_rows(&rows, y, None).unwrap()
}

fn same_value(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

proptest! {
    // ==================== Program Properties ====================

    #[test]
    fn generated_height_within_bounds(
        seed in any::<u64>(),
        min_height in 0usize..4,
        extra in 0usize..3
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let max_height = min_height + extra;
        let gen = generator(3, min_height, max_height);
        for _ in 0..10 {
            let height = gen.generate(&mut rng).height();
            prop_assert!(height >= min_height && height <= max_height);
        }
    }

    #[test]
    fn generated_terminals_in_range(seed in any::<u64>(), n_features in 1usize..6) {
        let mut rng = StdRng::seed_from_u64(seed);
        let program = Program::new(generator(n_features, 1, 4).generate(&mut rng));
        prop_assert!(program.check_features(n_features).is_ok());
    }

    #[test]
    fn text_form_evaluates_identically(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let program = Program::new(generator(2, 0, 4).generate(&mut rng));
        let parsed: Program = program.to_string().parse().unwrap();
        let ds = dataset(2);
        for (a, b) in program.evaluate(&ds).iter().zip(parsed.evaluate(&ds)) {
            prop_assert!(same_value(*a, b));
        }
    }

    #[test]
    fn json_form_evaluates_identically(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let program = Program::new(generator(2, 0, 4).generate(&mut rng));
        let parsed = Program::from_json(&program.to_json().unwrap()).unwrap();
        let ds = dataset(2);
        for (a, b) in program.evaluate(&ds).iter().zip(parsed.evaluate(&ds)) {
            prop_assert!(same_value(*a, b));
        }
    }

    #[test]
    fn column_and_row_evaluation_agree(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let program = Program::new(generator(3, 1, 4).generate(&mut rng));
        let ds = dataset(3);
        let columns = program.evaluate(&ds);
        for (i, value) in columns.iter().enumerate() {
            prop_assert!(same_value(*value, program.evaluate_row(&ds.row(i))));
        }
    }

    #[test]
    fn size_at_least_height_plus_one(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let program = Program::new(generator(2, 0, 5).generate(&mut rng));
        prop_assert!(program.size() > program.height());
        prop_assert_eq!(program.root().positions().len(), program.size());
    }

    // ==================== Operator Properties ====================

    #[test]
    fn offspring_respect_height_bounds(seed in any::<u64>(), size in 2usize..20) {
        let mut rng = StdRng::seed_from_u64(seed);
        let gen = generator(2, 2, 4);
        let population = Population::random(size, &gen, &mut rng);
        let pool: Vec<Individual> = population
            .into_individuals()
            .into_iter()
            .enumerate()
            .map(|(i, mut ind)| {
                ind.fitness = Some(i as f64);
                ind
            })
            .collect();
        let breeder = Breeder::new(
            &gen,
            0.5,
            ReproductionProbabilities {
                point_mutation: 0.25,
                subtree_mutation: 0.25,
                hoist_mutation: 0.25,
                subtree_crossover: 0.25,
            },
        );
        let next = breeder.next_generation(&pool, 1, &mut rng);
        prop_assert_eq!(next.len(), size);
        for ind in &next {
            let height = ind.program().height();
            prop_assert!((2..=4).contains(&height));
        }
    }

    #[test]
    fn tournament_selects_valid_index(seed in any::<u64>(), size in 1usize..30) {
        let mut rng = StdRng::seed_from_u64(seed);
        let pool: Vec<Individual> = (0..size)
            .map(|i| {
                let mut ind = Individual::new("x0".parse().unwrap());
                ind.fitness = Some((size - i) as f64);
                ind
            })
            .collect();
        let idx = TournamentSelection::default().select(&pool, &mut rng);
        prop_assert!(idx < size);
    }

    // ==================== Population Properties ====================

    #[test]
    fn population_size_preserved(seed in any::<u64>(), size in 0usize..40) {
        let mut rng = StdRng::seed_from_u64(seed);
        let population = Population::random(size, &generator(2, 1, 3), &mut rng);
        prop_assert_eq!(population.len(), size);
        prop_assert!(population.iter().all(|ind| !ind.is_evaluated()));
    }

    #[test]
    fn sampled_indices_distinct_and_sorted(
        seed in any::<u64>(),
        n in 1usize..50,
        fraction in 0.01f64..1.0
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let indices = sample_indices(n, fraction, &mut rng);
        prop_assert!(!indices.is_empty());
        prop_assert!(indices.len() <= n);
        prop_assert!(indices.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(indices.iter().all(|&i| i < n));
    }

    // ==================== Ensemble Properties ====================

    #[test]
    fn ensemble_is_base_plus_weighted_sum(
        seed in any::<u64>(),
        base in -5.0f64..5.0,
        steps in prop::collection::vec(-1.0f64..1.0, 0..5)
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let gen = generator(2, 0, 3);
        let ds = dataset(2);
        let mut ensemble = Ensemble::new(base);
        let mut expected = vec![base; ds.n_rows()];
        for step in steps {
            let program = Program::new(gen.generate(&mut rng));
            for (e, h) in expected.iter_mut().zip(program.evaluate(&ds)) {
                *e += step * h;
            }
            ensemble.push(program, step);
        }
        let preds = ensemble.predict(&ds).unwrap();
        for (p, e) in preds.iter().zip(&expected) {
            prop_assert!(same_value(*p, *e));
        }
    }

    // ==================== Metric Properties ====================

    #[test]
    fn regression_losses_non_negative(
        pairs in prop::collection::vec((-100.0f64..100.0, -100.0f64..100.0), 1..30)
    ) {
        let (y, p): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
        for name in ["mae", "mse", "rmse"] {
            let metric = metric_from_name(name).unwrap();
            prop_assert!(metric.score(&y, &p, None) >= 0.0);
            prop_assert_eq!(metric.score(&y, &y, None), 0.0);
        }
    }
}
