use perception_core::prelude::*;
use perception_core::randomizer::TargetCommand;
use perception_core::sampler::SamplerSpec;

/// Marks objects that are both rotated and hue shifted.
fn tag_props(tags: &mut TagManager) {
    for id in 1..=4 {
        tags.add_tag(ObjectId(id), RotationRandomizerTag);
        tags.add_tag(ObjectId(id), HueOffsetRandomizerTag);
    }
    tags.add_tag(ObjectId(100), SunAngleRandomizerTag);
}

fn main() -> anyhow::Result<()> {
    perception_core_examples::init_tracing();

    let config = match std::env::args().nth(1) {
        Some(path) => load_config(&path)?,
        None => ScenarioConfig::new(5).with_frames_per_iteration(2),
    };

    let mut scenario = Scenario::new(config)?;
    tag_props(scenario.tags_mut());
    scenario.add_randomizer(RotationRandomizer::new()?)?;
    scenario.add_randomizer(HueOffsetRandomizer::with_hue_offset(&ParameterSpec::float(
        SamplerSpec::normal(-90.0, 90.0, 0.0, 30.0),
    ))?)?;
    scenario.add_randomizer(SunAngleRandomizer::with_parameters(
        &ParameterSpec::float(SamplerSpec::uniform(6.0, 18.0)),
        &ParameterSpec::float(SamplerSpec::uniform(0.0, 365.0)),
        &ParameterSpec::float(SamplerSpec::constant(52.5)),
    )?)?;

    let mut sink = FnSink::new(|event| match event {
        ScenarioEvent::IterationStarted { iteration, seed, .. } => {
            tracing::info!(iteration, seed, "iteration started")
        }
        ScenarioEvent::Warning { context, message } => tracing::warn!(%context, "{message}"),
        other => tracing::debug!(?other, "event"),
    });

    let mut target = RecordingTarget::new();
    let ticks = scenario.run_to_completion(&mut target, &mut sink, 10_000)?;
    anyhow::ensure!(scenario.is_complete(), "scenario did not finish in {ticks} ticks");

    let (mut rotations, mut properties) = (0, 0);
    for command in target.commands() {
        match command {
            TargetCommand::SetRotation(..) => rotations += 1,
            TargetCommand::SetProperty(..) => properties += 1,
            _ => {}
        }
    }
    tracing::info!(ticks, rotations, properties, "scene randomized");
    Ok(())
}

#[cfg(not(feature = "ron"))]
fn load_config(path: &str) -> anyhow::Result<ScenarioConfig> {
    anyhow::bail!("reading {path} needs the `ron` feature")
}

#[cfg(feature = "ron")]
fn load_config(path: &str) -> anyhow::Result<ScenarioConfig> {
    Ok(ScenarioConfig::load_ron(path)?)
}
