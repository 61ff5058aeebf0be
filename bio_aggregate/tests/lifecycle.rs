use bio_aggregate::prelude::*;
use nalgebra::{Vector2, Vector3};

fn aggregate<const D: usize>(settings: AggregateSettings) -> DefaultAggregate<D> {
    DefaultAggregate::<D>::new(
        settings,
        GabrielGraph::default(),
        ContactInteraction::default(),
    )
    .unwrap()
}

fn ample_substrates<const D: usize>(aggregate: &mut DefaultAggregate<D>) {
    aggregate.add_substrate(ConstantSubstrate { value: 1.0 });
    aggregate.add_substrate(ConstantSubstrate { value: 1.0 });
}

#[test]
fn egg_is_single_founding_cell() {
    let settings = AggregateSettings::default();
    let mut aggregate = aggregate::<3>(settings.clone());
    let egg = aggregate.create_egg(Vector3::new(1.0, -2.0, 0.5)).unwrap();
    assert_eq!(aggregate.number_of_cells(), 1);
    let cell = aggregate.get_cell(&egg).unwrap();
    assert_eq!(cell.generation(), 0);
    assert_eq!(cell.radius(), settings.cell.default_radius);
    assert_eq!(cell.force(), Vector3::zeros());
    assert_eq!(cell.parent_id(), None);
    assert_eq!(cell.cellular_aggregate(), Some(aggregate.handle()));
}

#[test]
fn mitosis_conserves_mass_and_lineage() {
    let mut aggregate = aggregate::<3>(AggregateSettings::default());
    let egg = aggregate.create_egg(Vector3::zeros()).unwrap();
    let color = CellColor::rgb(0.9, 0.1, 0.3);
    aggregate.get_cell_mut(&egg).unwrap().set_color(color);
    let radius = aggregate.get_cell(&egg).unwrap().radius();
    let n_before = aggregate.number_of_cells();

    let (a, b) = aggregate.mitosis(egg).unwrap();
    assert_eq!(aggregate.number_of_cells(), n_before - 1 + 2);
    assert!(matches!(
        aggregate.get_cell(&egg),
        Err(NotFound(_))
    ));
    for daughter in [a, b] {
        let cell = aggregate.get_cell(&daughter).unwrap();
        assert_eq!(cell.generation(), 1);
        assert_eq!(cell.color(), color);
        assert_eq!(cell.parent_id(), Some(egg));
        approx::assert_abs_diff_eq!(
            cell.radius(),
            radius / 2f64.powf(1.0 / 3.0),
            epsilon = 1e-12
        );
    }
    let p_a = aggregate.position(&a).unwrap();
    let p_b = aggregate.position(&b).unwrap();
    approx::assert_abs_diff_eq!(p_a + p_b, Vector3::zeros(), epsilon = 1e-12);
    approx::assert_abs_diff_eq!(
        (p_a - p_b).norm(),
        2.0 * aggregate.settings().mitosis_perturbation_length,
        epsilon = 1e-12
    );
}

#[test]
fn apoptosis_removes_from_all_lookups() {
    let mut aggregate = aggregate::<2>(AggregateSettings::default());
    ample_substrates(&mut aggregate);
    let egg = aggregate.create_egg(Vector2::zeros()).unwrap();
    let (a, b) = aggregate.mitosis(egg).unwrap();
    aggregate.compute_closest_points().unwrap();
    aggregate.apoptosis(&a).unwrap();

    assert_eq!(aggregate.number_of_cells(), 1);
    assert!(matches!(aggregate.get_cell(&a), Err(NotFound(_))));
    assert!(matches!(aggregate.position(&a), Err(NotFound(_))));
    assert!(matches!(aggregate.get_voronoi(&a), Err(NotFound(_))));
    assert!(matches!(
        aggregate.substrate_value(&a, 0),
        Err(AggregateError::NotFound(_))
    ));
    assert!(matches!(
        aggregate.remove(&a),
        Err(NotFound(_))
    ));
    assert!(!aggregate.get_voronoi(&b).unwrap().neighbors.contains(&a));
}

#[test]
fn kill_all_is_idempotent() {
    let mut aggregate = aggregate::<2>(AggregateSettings::default());
    let egg = aggregate.create_egg(Vector2::zeros()).unwrap();
    aggregate.mitosis(egg).unwrap();
    assert_eq!(aggregate.kill_all(), 2);
    assert_eq!(aggregate.number_of_cells(), 0);
    assert_eq!(aggregate.kill_all(), 0);
    assert_eq!(aggregate.number_of_cells(), 0);
    // An emptied aggregate can be seeded again
    aggregate.create_egg(Vector2::zeros()).unwrap();
    assert_eq!(aggregate.number_of_cells(), 1);
}

#[test]
fn grows_two_ticks_then_divides() {
    let settings = AggregateSettings {
        cell: CellParameters {
            default_radius: 0.0,
            growth_radius_increment: 1.0,
            growth_radius_limit: 2.0,
            division_maximum_latency_time: 0,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut aggregate = aggregate::<2>(settings);
    ample_substrates(&mut aggregate);
    let egg = aggregate.create_egg(Vector2::zeros()).unwrap();

    aggregate.advance_time_step().unwrap();
    assert_eq!(aggregate.get_cell(&egg).unwrap().radius(), 1.0);
    aggregate.advance_time_step().unwrap();
    assert_eq!(aggregate.get_cell(&egg).unwrap().radius(), 2.0);
    assert_eq!(aggregate.number_of_cells(), 1);

    let summary = aggregate.advance_time_step().unwrap();
    assert_eq!(summary.divisions, 1);
    assert_eq!(aggregate.number_of_cells(), 2);
    for (_, cell, _) in aggregate.cells() {
        assert_eq!(cell.generation(), 1);
        assert_eq!(cell.parent_id(), Some(egg));
    }
}

#[test]
fn zero_substrate_starves_cell() {
    let settings = AggregateSettings {
        cell: CellParameters {
            nutrient_self_repair_level: 0.5,
            growth_maximum_latency_time: 4,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut aggregate = aggregate::<2>(settings.clone());
    aggregate.add_substrate(ConstantSubstrate { value: 0.0 });
    aggregate.add_substrate(ConstantSubstrate { value: 1.0 });
    let egg = aggregate.create_egg(Vector2::zeros()).unwrap();

    for tick in 1..=4 {
        let summary = aggregate.advance_time_step().unwrap();
        assert_eq!(summary.deaths, 0);
        let cell = aggregate.get_cell(&egg).unwrap();
        assert_eq!(cell.radius(), settings.cell.default_radius);
        assert_eq!(cell.growth_timer(), tick);
        assert!(cell.nutrient_level() > 0.0);
    }
    let summary = aggregate.advance_time_step().unwrap();
    assert_eq!(summary.deaths, 1);
    assert_eq!(summary.failures, 0);
    assert_eq!(aggregate.number_of_cells(), 0);
    assert!(aggregate.failures().is_empty());
}

#[test]
fn generation_limit_caps_division() {
    let settings = AggregateSettings {
        cell: CellParameters {
            default_radius: 2.0,
            division_maximum_latency_time: 0,
            maximum_generation_limit: 0,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut aggregate = aggregate::<2>(settings);
    ample_substrates(&mut aggregate);
    let egg = aggregate.create_egg(Vector2::zeros()).unwrap();
    assert!(matches!(
        aggregate.mitosis(egg),
        Err(AggregateError::InvalidState(_))
    ));
    let summary = aggregate.advance_time_step().unwrap();
    assert_eq!(summary.divisions, 0);
    assert_eq!(summary.deaths, 1);
    assert_eq!(aggregate.number_of_cells(), 0);
}

#[test]
fn growth_is_monotone_in_aggregate() {
    let settings = AggregateSettings {
        closest_point_interval: 2,
        cell: CellParameters {
            growth_radius_increment: 0.25,
            division_maximum_latency_time: 2,
            maximum_generation_limit: 3,
            ..Default::default()
        },
        ..Default::default()
    };
    let limit = settings.cell.growth_radius_limit;
    let mut aggregate = aggregate::<2>(settings);
    ample_substrates(&mut aggregate);
    aggregate.create_egg(Vector2::zeros()).unwrap();

    let mut radii = std::collections::BTreeMap::new();
    let (mut divisions, mut deaths) = (0, 0);
    for _ in 0..40 {
        let summary = aggregate.advance_time_step().unwrap();
        divisions += summary.divisions;
        deaths += summary.deaths;
        for (id, cell, _) in aggregate.cells() {
            if let Some(previous) = radii.insert(*id, cell.radius()) {
                assert!(cell.radius() >= previous);
            }
            assert!(cell.radius() <= limit);
        }
    }
    // Generations 0 to 2 divide while all 8 cells of generation 3 die of senescence
    assert_eq!(divisions, 7);
    assert_eq!(deaths, 8);
    assert_eq!(aggregate.number_of_cells(), 0);
    assert!(aggregate.failures().is_empty());
}

#[test]
fn substrate_value_errors() {
    let mut aggregate = aggregate::<2>(AggregateSettings::default());
    let index = aggregate.add_substrate(LinearGradientSubstrate {
        offset: 0.5,
        gradient: Vector2::new(1.0, 0.0),
    });
    assert_eq!(index, 0);
    assert_eq!(aggregate.substrates().len(), 1);
    let egg = aggregate.create_egg(Vector2::new(0.25, 3.0)).unwrap();
    assert_eq!(aggregate.substrate_value(&egg, 0).unwrap(), 0.75);
    assert!(matches!(
        aggregate.substrate_value(&egg, 1),
        Err(AggregateError::IndexOutOfRange(_))
    ));
    assert!(matches!(
        aggregate.substrate_value(&CellIdentifier(42), 0),
        Err(AggregateError::NotFound(_))
    ));
}

#[test]
fn malformed_cell_does_not_halt_simulation() {
    let mut aggregate = aggregate::<2>(AggregateSettings::default());
    ample_substrates(&mut aggregate);
    let egg = aggregate.create_egg(Vector2::zeros()).unwrap();
    let parameters = aggregate.settings().cell.clone();
    let other = aggregate
        .add_beside(&egg, Cell::new(&parameters), 3.0)
        .unwrap();
    aggregate.get_cell_mut(&other).unwrap().set_radius(-1.0);

    let summary = aggregate.advance_time_step().unwrap();
    assert_eq!(summary.failures, 1);
    assert_eq!(aggregate.number_of_cells(), 1);
    let failure = &aggregate.failures()[0];
    assert_eq!(failure.identifier, other);
    assert_eq!(failure.iteration, 0);
    aggregate.advance_time_step().unwrap();
    assert!(aggregate.get_cell(&egg).is_ok());
}

#[test]
fn malformed_neighbor_does_not_corrupt_aggregate() {
    let mut aggregate = aggregate::<2>(AggregateSettings::default());
    ample_substrates(&mut aggregate);
    let egg = aggregate.create_egg(Vector2::zeros()).unwrap();
    let parameters = aggregate.settings().cell.clone();
    let other = aggregate
        .add(Cell::new(&parameters), Vector2::new(1.5, 0.0))
        .unwrap();
    aggregate.compute_closest_points().unwrap();
    assert!(aggregate.get_voronoi(&egg).unwrap().neighbors.contains(&other));
    aggregate.get_cell_mut(&other).unwrap().set_radius(f64::NAN);

    for _ in 0..4 {
        aggregate.advance_time_step().unwrap();
        let position = aggregate.position(&egg).unwrap();
        assert!(position.iter().all(|x| x.is_finite()));
    }
    assert_eq!(aggregate.failures().len(), 1);
    assert_eq!(aggregate.failures()[0].identifier, other);
    assert_eq!(aggregate.number_of_cells(), 1);
}

#[test]
fn lowering_growth_limit_below_living_cells_is_rejected() {
    let mut aggregate = aggregate::<2>(AggregateSettings::default());
    ample_substrates(&mut aggregate);
    let egg = aggregate.create_egg(Vector2::zeros()).unwrap();
    for _ in 0..5 {
        aggregate.advance_time_step().unwrap();
    }
    let radius = aggregate.get_cell(&egg).unwrap().radius();
    assert!(radius > 1.0);
    assert!(aggregate.set_growth_radius_limit(1.0).is_err());
    aggregate.set_growth_radius_limit(radius).unwrap();
    let summary = aggregate.advance_time_step().unwrap();
    assert_eq!(summary.failures, 0);
    assert!(aggregate.failures().is_empty());
}

#[test]
fn unbound_cells_reject_lifecycle_requests() {
    let parameters = CellParameters::default();
    let mut cell = Cell::<2>::new(&parameters);
    assert!(matches!(cell.mitosis(), Err(PreconditionViolation(_))));
    assert!(matches!(
        cell.apoptosis(ApoptosisCause::External),
        Err(PreconditionViolation(_))
    ));
    let position = Vector2::zeros();
    let context = ReceptorContext {
        aggregate: AggregateHandle(0),
        position: &position,
        substrates: &[],
    };
    assert!(matches!(
        cell.receptors_reading(&context, &parameters),
        Err(PreconditionViolation(_))
    ));
}
