use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use image::{Rgba, RgbaImage};
use tileview::{
    constants::CALLOUT_SIZE, Anchor, DirectoryTileProvider, DrawCommand, InputEvent, MapView,
    MapViewConfiguration, MarkerOptions, MarkerTap, OverlaySize, Point, RenderContext,
    TileAddress, TileError, TileProvider,
};

const SCREEN: (f64, f64) = (1280.0, 720.0);

/// Tiles from disk when a directory is given, generated checkerboard tiles otherwise
enum DemoTiles {
    Directory(DirectoryTileProvider),
    Synthetic { tile_size: u32 },
}

impl TileProvider<RgbaImage> for DemoTiles {
    fn fetch(&self, address: TileAddress) -> Result<Option<RgbaImage>, TileError> {
        match self {
            DemoTiles::Directory(provider) => provider.fetch(address),
            DemoTiles::Synthetic { tile_size } => {
                let shade = if (address.row + address.col) % 2 == 0 { 200 } else { 120 };
                let tint = (address.level * 30).min(255) as u8;
                Ok(Some(RgbaImage::from_pixel(
                    *tile_size,
                    *tile_size,
                    Rgba([shade, tint, 255 - tint, 255]),
                )))
            }
        }
    }
}

/// Headless walk through a session: configure, add markers, tap one to open
/// a callout, then pan and zoom around while tiles stream in
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tileview::init_logging();

    let config = match std::env::args().nth(1) {
        Some(path) if path.ends_with(".json") => {
            let json = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            MapViewConfiguration::from_json(&json).with_context(|| format!("parsing {path}"))?
        }
        _ => MapViewConfiguration::new(7, 15360, 8640, 256).set_max_scale(3.0),
    };
    let tiles = match std::env::args().nth(2).map(PathBuf::from) {
        Some(root) if root.is_dir() => DemoTiles::Directory(DirectoryTileProvider::new(root)),
        Some(root) => bail!("tile directory {} does not exist", root.display()),
        None => DemoTiles::Synthetic {
            tile_size: config.tile_size,
        },
    };

    let mut view: MapView<RgbaImage> = MapView::new(SCREEN.0, SCREEN.1);
    view.configure(config, tiles).context("configuring map view")?;
    view.define_bounds(0.0, 0.0, 1.0, 1.0)?;

    let building = view.add_marker(
        MarkerOptions::new(0.595, 0.56)
            .anchor(-0.5, -1.0)
            .title("Residential Building"),
    )?;
    view.add_marker(
        MarkerOptions::new(0.35, 0.506)
            .anchor(-0.5, -0.5)
            .size(32.0, 32.0)
            .title("Street View"),
    )?;

    view.set_marker_tap_listener(|view: &mut MapView<RgbaImage>, tap: MarkerTap| {
        let title = view
            .overlay(tap.handle)
            .and_then(|marker| marker.title.clone())
            .unwrap_or_default();
        log::info!(
            "tapped {:?} '{}' at ({:.1}, {:.1})",
            tap.handle,
            title,
            tap.local_x,
            tap.local_y
        );

        let size = OverlaySize::new(CALLOUT_SIZE.0 as f64, CALLOUT_SIZE.1 as f64);
        match view.add_callout(tap.position.x, tap.position.y, Anchor::callout(), size) {
            Ok(callout) => {
                if let Err(e) = view.transition_in(callout) {
                    log::warn!("callout transition failed: {}", e);
                }
            }
            Err(e) => log::warn!("could not open callout: {}", e),
        }
    });

    settle(&mut view).await;
    report(&mut view, "initial");

    view.set_scale(1.0);
    view.scroll_to(0.595, 0.56);
    settle(&mut view).await;
    report(&mut view, "zoomed onto building");

    let marker_rect = view
        .overlay(building)
        .map(|marker| marker.screen_rect())
        .context("building marker disappeared")?;
    view.handle_input(InputEvent::Tap {
        position: marker_rect.center(),
    });
    report(&mut view, "after marker tap");

    let script = [
        InputEvent::Drag {
            delta: Point::new(-300.0, 120.0),
        },
        InputEvent::Zoom {
            factor: 0.5,
            focus: Point::new(640.0, 360.0),
        },
        InputEvent::DoubleTap {
            position: Point::new(200.0, 200.0),
        },
        InputEvent::Tap {
            position: Point::new(5.0, 5.0),
        },
        InputEvent::Resize {
            size: Point::new(1920.0, 1080.0),
        },
    ];
    for event in script {
        log::info!("input {:?} -> {:?}", event, view.handle_input(event.clone()));
        settle(&mut view).await;
    }
    report(&mut view, "end of script");

    Ok(())
}

/// Applies tile results until nothing is in flight (or we give up)
async fn settle(view: &mut MapView<RgbaImage>) {
    for _ in 0..200 {
        view.process_tile_results();
        if view.pending_fetches() == 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    log::warn!("{} tile fetches still outstanding", view.pending_fetches());
}

fn report(view: &mut MapView<RgbaImage>, label: &str) {
    let mut ctx = RenderContext::new(view.viewport().size().x, view.viewport().size().y);
    view.render(&mut ctx);

    let tiles = ctx.tiles().count();
    let callouts = ctx
        .commands()
        .iter()
        .filter(|command| matches!(command, DrawCommand::Overlay { is_callout: true, .. }))
        .count();
    log::info!(
        "{}: scale {:.4}, level {:?}, {} tiles drawn of {} visible, {} overlays ({} callouts)",
        label,
        view.scale(),
        view.tile_level(),
        tiles,
        view.visible_tiles().len(),
        ctx.overlays().count(),
        callouts
    );
}
