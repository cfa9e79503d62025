//! Top-down map viewer with BSP visibility overlay.
//!
//! ```bash
//! cargo run --release --bin map_view -- assets/doom1.wad --map E1M1
//! RUST_LOG=debug cargo run --bin map_view -- assets/doom1.wad --debug
//! ```
//!
//! Controls W/S = walk ←/→ = turn arrows ↑/↓ + A/D = pan Esc = quit

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use log::info;
use minifb::{Key, Window, WindowOptions};

use bspmap_rs::{
    renderer::{
        AutomapOptions, NATIVE_HEIGHT, NATIVE_WIDTH, SCALE_FACTOR, Software, Viewport, draw_map,
    },
    wad::{Wad, load_map},
    world::{Action, FrameState, InputSource},
};

/// CLI options handled via `clap` derive.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Opts {
    /// Path to the IWAD/PWAD
    #[arg(value_name = "WAD")]
    wad: PathBuf,

    /// Map marker to open (defaults to the first map in the archive)
    #[arg(long, short)]
    map: Option<String>,

    /// Pixels per native pixel; map units are divided by 20 before scaling
    #[arg(long, default_value_t = SCALE_FACTOR)]
    scale: f32,

    /// Window width in pixels
    #[arg(long, default_value_t = NATIVE_WIDTH * SCALE_FACTOR as usize)]
    width: usize,

    /// Window height in pixels
    #[arg(long, default_value_t = NATIVE_HEIGHT * SCALE_FACTOR as usize)]
    height: usize,

    /// Outline every node bounding box
    #[arg(long)]
    debug: bool,
}

/// Keyboard → action mapping for a minifb window.
struct Keys<'a>(&'a Window);

impl InputSource for Keys<'_> {
    fn is_held(&self, action: Action) -> bool {
        let key = match action {
            Action::Forward => Key::W,
            Action::Backward => Key::S,
            Action::TurnLeft => Key::Left,
            Action::TurnRight => Key::Right,
            Action::PanUp => Key::Up,
            Action::PanDown => Key::Down,
            Action::PanLeft => Key::A,
            Action::PanRight => Key::D,
        };
        self.0.is_key_down(key)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opts = Opts::parse();

    /*----- load map -------------------------------------------------*/
    let wad = Wad::from_file(&opts.wad)
        .with_context(|| format!("cannot open {}", opts.wad.display()))?;
    let name = match opts.map {
        Some(name) => name,
        None => match wad.level_indices().first() {
            Some(&idx) => wad.lump_name(idx).into_owned(),
            None => bail!("{} contains no maps", opts.wad.display()),
        },
    };
    let map = load_map(&wad, &name)?;
    info!("viewing {name}");

    /*----- per-frame state -----------------------------------------*/
    let vp = Viewport::new(opts.width as f32, opts.height as f32, opts.scale);
    let automap = AutomapOptions {
        show_bboxes: opts.debug,
        ..Default::default()
    };
    let mut frame = FrameState::spawn(&map);
    let mut renderer = Software::default();

    /*----- window ---------------------------------------------------*/
    let mut win = Window::new(
        &format!("{name} - map view"),
        opts.width,
        opts.height,
        WindowOptions::default(),
    )?;
    win.set_target_fps(60);

    /*========================== main loop ==========================*/
    while win.is_open() && !win.is_key_down(Key::Escape) {
        // input strictly before traversal
        frame.apply_input(&Keys(&win));

        renderer.begin_frame(opts.width, opts.height);
        draw_map(&mut renderer, &map, &frame, &vp, &automap)?;
        renderer.end_frame(|fb, w, h| win.update_with_buffer(fb, w, h))?;
    }
    Ok(())
}
