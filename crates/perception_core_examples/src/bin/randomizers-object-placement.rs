use glam::Vec2;
use perception_core::prelude::*;
use perception_core_examples::{init_tracing, render_points_to_png, PointStyle, RenderConfig};

const ITERATIONS: u32 = 3;

fn main() -> anyhow::Result<()> {
    init_tracing();
    let area = Vec2::new(40.0, 40.0);

    let prefabs = CategoricalSpec::weighted([
        ("crate".to_string(), 3.0),
        ("barrel".to_string(), 2.0),
        ("cone".to_string(), 1.0),
    ]);
    let placement = ObjectPlacementRandomizer::new(area, &prefabs)?
        .with_separation_distance(2.5)
        .with_depth(5.0);

    let config = ScenarioConfig::new(ITERATIONS).with_random_seed(1234);
    let mut scenario = Scenario::new(config)?;
    scenario.add_randomizer(placement)?;

    let mut render = RenderConfig::new((800, 800), area).with_background([250, 248, 240]);
    render
        .set_style(
            "crate",
            PointStyle::Square {
                color: [150, 100, 50],
                half_size: 7,
            },
        )
        .set_style(
            "barrel",
            PointStyle::Circle {
                color: [60, 60, 160],
                radius: 7,
            },
        )
        .set_style(
            "cone",
            PointStyle::Circle {
                color: [240, 120, 0],
                radius: 4,
            },
        );

    let mut target = RecordingTarget::new();
    let mut sink = VecSink::new();
    while !scenario.is_complete() {
        let state = scenario.tick(&mut target, &mut sink)?;
        if state != ScenarioState::Iterating {
            continue;
        }
        let iteration = scenario.current_iteration();
        let points: Vec<(&str, Vec2)> = target
            .live_instances()
            .into_iter()
            .map(|(prefab, position)| (prefab, position.truncate()))
            .collect();
        render_points_to_png(
            points,
            &render,
            format!("randomizers-object-placement-{iteration}.png"),
        )?;
    }

    tracing::info!(events = sink.len(), "scenario finished");
    Ok(())
}
