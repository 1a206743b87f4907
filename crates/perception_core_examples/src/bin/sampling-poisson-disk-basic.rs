use glam::Vec2;
use perception_core::prelude::*;
use perception_core_examples::{init_tracing, render_points_to_png, PointStyle, RenderConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> anyhow::Result<()> {
    init_tracing();
    let extent = Vec2::new(100.0, 60.0);

    let plain = PoissonDiskSampling::new(3.0).generate(extent.x, extent.y, 7)?;
    let padded = PoissonDiskSampling::new(3.0)
        .with_pad_edges(true)
        .generate(extent.x, extent.y, 7)?;
    let mut rng = StdRng::seed_from_u64(7);
    let std_rng = PoissonDiskSampling::new(3.0).generate_with(extent.x, extent.y, &mut rng)?;
    tracing::info!(
        plain = plain.len(),
        padded = padded.len(),
        std_rng = std_rng.len(),
        "generated points"
    );

    for (name, points) in [("plain", &plain), ("padded", &padded), ("std-rng", &std_rng)] {
        let mut config = RenderConfig::new((1000, 600), extent)
            .with_origin(Vec2::ZERO)
            .with_background([235, 235, 235]);
        config.set_style(
            "point",
            PointStyle::Circle {
                color: [30, 90, 200],
                radius: 6,
            },
        );
        let out = format!("sampling-poisson-disk-{name}.png");
        render_points_to_png(
            points.iter().map(|p| ("point", Vec2::from(*p))),
            &config,
            out,
        )?;
    }
    Ok(())
}
