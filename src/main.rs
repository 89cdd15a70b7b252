use std::io::{self, Write};

use log::warn;
use rand::Rng;

use fractal_canvas::{
    CONFIG_FILE, FractalKind, PixelSurface, Renderer, RenderSummary, SESSION_FILE, Session,
    TickStatus, ViewerConfig, export, visualizer,
};

fn render_headless(config: &ViewerConfig, session: &Session) -> fractal_canvas::Result<(PixelSurface, RenderSummary)> {
    let mut surface = PixelSurface::new(config.canvas_width, config.canvas_height, config.style.background_color)?;
    let mut renderer = Renderer::new(fractal_canvas::RenderOptions { seed: session.seed, ..config.render_options() });
    let kind = session.kind;
    let request = fractal_canvas::RenderRequest {
        kind,
        level: session.current_level(),
        area: config.draw_area(kind),
        style: config.style,
        animation: session.animation,
    };
    let summary = renderer.render(&request, &mut surface)?;
    let mut ticks = 0;
    let mut report = match summary.first_tick {
        Some(first) => first,
        None => renderer.tick(&mut surface),
    };
    loop {
        ticks += 1;
        if report.base_reached {
            println!("  base case reached after {} elements (tick {})", report.cursor, ticks);
        }
        if report.status != TickStatus::Pending {
            break;
        }
        report = renderer.tick(&mut surface);
    }
    println!("  drawn in {} tick(s)", ticks);
    Ok((surface, summary))
}

fn print_summary(summary: &RenderSummary) {
    println!("  {}: {} elements, {} base", summary.kind, summary.stats.total, summary.stats.base);
    if !summary.kind.is_raster() {
        for (level, count) in &summary.stats.per_level {
            println!("    level {:>2}: {}", level, count);
        }
    }
    if let Some(fit) = summary.fit {
        println!("  fit: scale {:.3} offset ({:.1}, {:.1})", fit.scale, fit.offset_x, fit.offset_y);
    }
}

fn print_settings(session: &Session) {
    let kind = session.kind;
    let (lo, hi) = kind.level_range();
    println!(
        "  {} | {} {} (range {}-{}) | animate {} speed {} | seed {}\n",
        kind,
        kind.level_name(),
        session.current_level(),
        lo,
        hi,
        if session.animation.enabled { "on" } else { "off" },
        session.animation.speed,
        session.seed
    );
}

/// Write failures are reported, never fatal to the shell.
fn write_config(config: &ViewerConfig, path: &str) -> String {
    match config.save(path) {
        Ok(()) => format!("wrote {}", path),
        Err(e) => format!("could not write {}: {}", path, e),
    }
}

fn write_session(session: &Session, path: &str) -> String {
    match session.save(path) {
        Ok(()) => "saved session".to_string(),
        Err(e) => format!("could not save session: {}", e),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut config = ViewerConfig::load(CONFIG_FILE)?;
    let mut session = match Session::load(SESSION_FILE) {
        Ok(s) => s,
        Err(_) => Session::new(config.kind, config.animation, config.seed),
    };

    println!("\n╭──────────────────────────────────────────╮");
    println!("│              fractal canvas              │");
    println!("│                                          │");
    println!("│ koch  sierpinski  tree  pythagoras       │");
    println!("│ mandelbrot  terrain  biome               │");
    println!("│                                          │");
    println!("│ /kind <name>     - choose a fractal      │");
    println!("│ /depth <n>       - depth/iters/octaves   │");
    println!("│ /animate         - toggle animation      │");
    println!("│ /speed <0-10>    - animation speed       │");
    println!("│ /seed [n]        - noise seed            │");
    println!("│ /render          - render and show stats │");
    println!("│ /export [path]   - render to png         │");
    println!("│ /view            - open the window       │");
    println!("│ /state  /config  /save  /quit            │");
    println!("╰──────────────────────────────────────────╯\n");
    print_settings(&session);

    loop {
        print!("fractal: ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();
        if input.is_empty() { continue; }

        let (command, arg) = match input.split_once(' ') {
            Some((c, a)) => (c, a.trim()),
            None => (input, ""),
        };

        match command {
            "/quit" => break,
            "/state" => print_settings(&session),
            "/kind" => match arg.parse::<FractalKind>() {
                Ok(kind) => {
                    session.kind = kind;
                    print_settings(&session);
                }
                Err(e) => println!("{}\n", e),
            },
            "/depth" => match arg.parse::<u32>() {
                Ok(level) => match session.set_level(session.kind, level) {
                    Ok(()) => print_settings(&session),
                    Err(e) => println!("{}\n", e),
                },
                Err(_) => println!("usage: /depth <n>\n"),
            },
            "/animate" => {
                session.animation.enabled = !session.animation.enabled;
                print_settings(&session);
            }
            "/speed" => match arg.parse::<u32>() {
                Ok(speed) if speed <= fractal_canvas::MAX_SPEED => {
                    session.animation.speed = speed;
                    print_settings(&session);
                }
                _ => println!("usage: /speed <0-{}>\n", fractal_canvas::MAX_SPEED),
            },
            "/seed" => {
                session.seed = if arg.is_empty() {
                    rand::thread_rng().gen_range(1..u32::MAX)
                } else {
                    match arg.parse::<u32>() {
                        Ok(seed) => seed,
                        Err(_) => {
                            println!("usage: /seed [n]\n");
                            continue;
                        }
                    }
                };
                print_settings(&session);
            }
            "/render" => match render_headless(&config, &session) {
                Ok((_, summary)) => {
                    print_summary(&summary);
                    println!();
                }
                Err(e) => println!("render failed: {}\n", e),
            },
            "/export" => {
                let path = if arg.is_empty() { config.export_path.clone() } else { arg.to_string() };
                match render_headless(&config, &session)
                    .and_then(|(surface, _)| export::save_png(surface.buffer(), &path))
                {
                    Ok(()) => println!("saved {}\n", path),
                    Err(e) => println!("export failed: {}\n", e),
                }
            }
            "/view" => {
                config.kind = session.kind;
                match visualizer::run(config.clone(), session.clone()) {
                    Ok(s) => {
                        session = s;
                        print_settings(&session);
                    }
                    Err(e) => println!("window unavailable: {}\n", e),
                }
            }
            "/config" => {
                config.kind = session.kind;
                config.animation = session.animation;
                config.seed = session.seed;
                println!("{}\n", write_config(&config, CONFIG_FILE));
            }
            "/save" => println!("{}\n", write_session(&session, SESSION_FILE)),
            _ => println!("unknown command: {}\n", command),
        }
    }

    if let Err(e) = session.save(SESSION_FILE) {
        warn!("could not save session: {}", e);
    }
    println!("bye");
    Ok(())
}
