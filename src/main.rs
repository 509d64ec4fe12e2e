use anyhow::{Result, anyhow};
use pane_config::{LevelData, PaneConfig};
use pane_core::{BlendMode, Painter, SpriteBatch};
use windowpane::PaneScene;

const DEFAULT_LEVEL: &str = "demos/basic.toml";
const FRAMES: u64 = 4;

fn main() -> Result<()> {
    let config = PaneConfig::load();

    // RUST_LOG wins over the config file filter
    let mut logger = env_logger::Builder::new();
    match std::env::var("RUST_LOG") {
        Ok(filter) => logger.parse_filters(&filter),
        Err(_) => logger.parse_filters(&config.logging.filter),
    };
    let _ = logger.try_init();

    let path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_LEVEL.to_string());
    let level = LevelData::load_from_file(&path).map_err(|e| anyhow!("{path}: {e}"))?;

    let mut gfx = Painter::new();
    let mut scene = PaneScene::from_level(config.compositor.clone(), &level, &mut gfx);

    let host_layers = scene
        .background()
        .iter()
        .chain(scene.foreground())
        .filter(|&l| scene.host_should_draw(l.as_ref()))
        .count();
    let kept_visible = scene
        .background()
        .iter()
        .chain(scene.foreground())
        .filter(|&l| scene.host_keeps_visible(l.as_ref()))
        .count();
    log::info!(
        "{path}: {} windows in {} groups, host draws {host_layers} layers, \
         keeps {kept_visible} visible",
        scene.windows().count(),
        scene.registry().len(),
    );

    for frame in 1..=FRAMES {
        if frame == 3 {
            // simulate a lost device between frames
            gfx.lose_device();
            let recreated = scene.graphics_device_reset(&mut gfx);
            log::warn!("device reset, {recreated} group targets recreated");
        }

        scene.update();
        let composed = scene.before_render(&mut gfx);

        gfx.begin(BlendMode::AlphaBlend);
        let turns = scene.render(&mut gfx);
        gfx.end();
        let below = scene.render_below(&mut gfx);
        let above = scene.render_above(&mut gfx);

        let list = gfx.take_display_list();
        log::info!(
            "frame {frame}: {composed} composed, {} turns, {below} below, \
             {above} above, {} commands",
            turns.len(),
            list.len(),
        );
        for (id, turn) in turns {
            log::debug!("  {id:?}: {turn:?}");
        }
    }

    if let Some(room) = level.room.as_deref() {
        let promoted = scene.transition_in(room);
        log::info!("transition into {room}: {promoted} leaders promoted");
    }

    scene.end_scene(&mut gfx);
    log::info!("scene ended, {} targets still live", gfx.live_targets());
    Ok(())
}
