use bio_aggregate::prelude::*;
use nalgebra::Vector2;

#[test]
fn json_results_match_snapshots() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let mut aggregate = DefaultAggregate::<2>::new(
        AggregateSettings::default(),
        GabrielGraph::default(),
        ContactInteraction::default(),
    )?;
    aggregate.add_substrate(ConstantSubstrate { value: 1.0 });
    aggregate.add_substrate(ConstantSubstrate { value: 1.0 });
    aggregate.create_egg(Vector2::new(3.0, 3.0))?;

    let mut storage = JsonStorageInterface::open_or_create(dir.path().join("cells"))?;
    let settings = SimulationSettings {
        n_steps: 20,
        save_interval: 5,
        show_progressbar: false,
    };
    let summaries = run_simulation(&mut aggregate, &settings, &mut storage)?;
    assert_eq!(summaries.iter().map(|s| s.divisions).sum::<usize>(), 1);

    assert_eq!(storage.get_all_iterations()?, vec![0, 5, 10, 15, 20]);
    let last: std::collections::BTreeMap<CellIdentifier, CellSnapshot<2>> =
        storage.load_all_elements_at_iteration(20)?;
    assert_eq!(last, aggregate.snapshot());
    assert_eq!(last.len(), 2);
    for snapshot in last.values() {
        assert_eq!(snapshot.generation, 1);
        assert_eq!(snapshot.parent_id, Some(CellIdentifier(0)));
    }
    let first = storage.load_all_elements_at_iteration(0)?;
    assert_eq!(first[&CellIdentifier(0)].position, Vector2::new(3.0, 3.0));
    assert_eq!(first[&CellIdentifier(0)].cycle_state, CellCycleState::Growing);
    Ok(())
}

#[test]
fn memory_storage_is_shared_between_clones() -> Result<(), Box<dyn std::error::Error>> {
    let mut aggregate = DefaultAggregate::<2>::new(
        AggregateSettings::default(),
        GabrielGraph::default(),
        ContactInteraction::default(),
    )?;
    aggregate.create_egg(Vector2::zeros())?;
    let reader = MemoryStorageInterface::<CellIdentifier, CellSnapshot<2>>::new();
    let mut writer = reader.clone();
    run_simulation(
        &mut aggregate,
        &SimulationSettings {
            n_steps: 4,
            save_interval: 2,
            show_progressbar: false,
        },
        &mut writer,
    )?;
    assert_eq!(reader.get_all_iterations()?, vec![0, 2, 4]);
    let all = reader.load_all_elements()?;
    assert_eq!(all[&4], aggregate.snapshot());
    Ok(())
}

#[test]
fn settings_from_files() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let ron_path = dir.path().join("settings.ron");
    std::fs::write(
        &ron_path,
        "(
            friction_coefficient: 4.0,
            closest_point_interval: 1,
            cell: (
                growth_radius_increment: 0.5,
                default_color: (red: 0.0, green: 0.5, blue: 1.0, alpha: 1.0),
                substrate_roles: (energy: None),
            ),
        )",
    )?;
    let settings = AggregateSettings::from_file(&ron_path)?;
    settings.validate()?;
    assert_eq!(settings.cell.substrate_roles.energy, None);
    assert_eq!(settings.cell.substrate_roles.nutrient, Some(0));

    let json_path = dir.path().join("settings.json");
    std::fs::write(&json_path, serde_json::to_string_pretty(&settings)?)?;
    assert_eq!(AggregateSettings::from_file(&json_path)?, settings);

    let mut aggregate = DefaultAggregate::<2>::new(
        settings,
        GabrielGraph::default(),
        ContactInteraction::default(),
    )?;
    let egg = aggregate.create_egg(Vector2::zeros())?;
    assert_eq!(aggregate.get_cell(&egg)?.color(), CellColor::rgb(0.0, 0.5, 1.0));
    aggregate.advance_time_step()?;
    assert_eq!(aggregate.get_cell(&egg)?.radius(), 1.5);
    Ok(())
}
