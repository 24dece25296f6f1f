mod common;

use common::{assert_close, fit, quick_config};
use naive_bayes_ttt::{
    Board, Dataset, Game, PosteriorEstimator, Token, Winner, params::component_names,
};

#[test]
fn every_retained_draw_is_inside_the_simplex() {
    let posterior = fit(&Dataset::reference(), 11);
    assert_eq!(posterior.samples().len(), 1_200);
    for draw in posterior.samples() {
        assert!(draw.is_interior(), "draw left the simplex: {draw:?}");
        for vector in draw.vectors() {
            assert_close(vector.iter().sum(), 1.0, 1e-9, "vector sum");
        }
    }
}

#[test]
fn empty_training_set_recovers_the_prior_mean() {
    let posterior = fit(&Dataset::empty(), 3);
    assert_eq!(posterior.games(), 0);

    let exact = posterior.exact().mean();
    for value in exact.components() {
        assert_close(value, 1.0 / 3.0, 1e-12, "exact posterior mean");
    }

    let mean = posterior.mean();
    for (name, value) in component_names().iter().zip(mean.components()) {
        assert_close(value, 1.0 / 3.0, 0.06, name);
    }
}

#[test]
fn a_single_x_win_shifts_theta_towards_x() {
    let dataset = Dataset::new(vec![Game::from_board(
        Winner::X,
        &Board::from_string("XXX OO. ...").unwrap(),
    )]);
    let posterior = fit(&dataset, 5);

    // Dir(2, 1, 1) has mean 1/2 for X.
    let exact = posterior.exact().mean();
    assert_close(exact.winner_probability(Winner::X), 0.5, 1e-12, "exact theta[X]");

    let mean = posterior.mean();
    assert!(mean.winner_probability(Winner::X) > 1.0 / 3.0);
    assert_close(mean.winner_probability(Winner::X), 0.5, 0.07, "sampled theta[X]");
    assert!(mean.token_probability(Winner::X, Token::Neither) > 1.0 / 3.0);
}

#[test]
fn sampled_means_agree_with_the_conjugate_posterior() {
    let posterior = fit(&Dataset::reference(), 21);
    for summary in posterior.summaries() {
        assert_close(summary.mean, summary.exact_mean, 0.06, &summary.name);
        assert_close(summary.sd, summary.exact_sd, 0.05, &summary.name);
        assert!(summary.interval.0 <= summary.mean && summary.mean <= summary.interval.1);
        assert!(summary.ess > 0.0);
    }
}

#[test]
fn map_estimate_is_deterministic_and_maximises_the_posterior() {
    let estimator = PosteriorEstimator::new(quick_config(1)).unwrap();
    let model = estimator.build_model(&Dataset::reference()).unwrap();
    let first = estimator.map_estimate(&model);
    let second = estimator.map_estimate(&model);

    assert_eq!(first, second);
    assert!(!first.fell_back_to_prior);
    assert!(first.params.is_valid());
    assert!(first.log_posterior >= model.log_posterior(&model.exact_posterior().mean()) - 1e-9);

    // Draw board has five X and four O under a flat prior.
    assert_close(
        first.params.token_probability(Winner::Neither, Token::X),
        5.0 / 9.0,
        1e-2,
        "MAP beta[Neither][X]",
    );
}

#[test]
fn unconverged_map_search_still_seeds_sampling() {
    let config = quick_config(6).with_map_max_iterations(2);
    let posterior = PosteriorEstimator::new(config)
        .unwrap()
        .fit(&Dataset::reference())
        .expect("non-convergence is not an error");

    let map = posterior.map();
    assert!(!map.converged);
    assert!(!map.fell_back_to_prior);
    assert!(map.params.is_valid());
    assert_eq!(map.iterations, 2);
    assert_eq!(posterior.samples().len(), 1_200);
    assert!(posterior.samples().iter().all(|draw| draw.is_interior()));
}

#[test]
fn seeded_runs_are_reproducible() {
    let a = fit(&Dataset::reference(), 99);
    let b = fit(&Dataset::reference(), 99);
    assert_eq!(a.samples(), b.samples());
    assert_eq!(a.diagnostics(), b.diagnostics());
}

#[test]
fn diagnostics_describe_the_run() {
    let posterior = fit(&Dataset::reference(), 8);
    let diagnostics = posterior.diagnostics();
    assert_eq!(diagnostics.iterations, 1_500);
    assert_eq!(diagnostics.burn_in, 300);
    assert_eq!(diagnostics.retained, 1_200);
    assert!(diagnostics.acceptance_rate > 0.3 && diagnostics.acceptance_rate <= 1.0);
    assert!(diagnostics.retained_divergences <= diagnostics.divergences);
    assert!(diagnostics.step_size > 0.0);
}
