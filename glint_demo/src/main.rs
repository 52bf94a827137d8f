use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

use glint::resource::{
    AttributeFormat, Buffer, BufferCreateInfo, Sampling, VertexArray, VertexAttribute,
};
use glint::traits::Destructible;
use glint::util::FrameTimer;
use glint::{BufferTarget, BufferUsage, HeadlessDriver, drain_errors};
use glint_assets::{LoadMode, Resource, ResourceState, ShaderPaths, Stage};

const FRAMES: usize = 3;

const VERTEX: &str = "#version 330 core
layout (location = 0) in vec2 pos;
layout (location = 1) in vec3 colour;
out vec3 v_colour;
void main() {
    v_colour = colour;
    gl_Position = vec4(pos, 0.0, 1.0);
}
";

const FRAGMENT: &str = "#version 330 core
in vec3 v_colour;
out vec4 frag;
void main() {
    frag = vec4(v_colour, 1.0);
}
";

#[rustfmt::skip]
const TRIANGLE: [f32; 15] = [
    // pos         colour
     0.0,  0.5,    1.0, 0.0, 0.0,
    -0.5, -0.5,    0.0, 1.0, 0.0,
     0.5, -0.5,    0.0, 0.0, 1.0,
];

#[derive(Debug, Default)]
struct Args {
    level: Option<Level>,
    shaders: Option<ShaderPaths>,
    texture: Option<PathBuf>,
}

/// `glint_demo [-v | -vv] [VERTEX FRAGMENT [TEXTURE]]`
fn parse_args() -> Result<Args> {
    let mut args = Args::default();
    let mut positional = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "-v" => args.level = Some(Level::DEBUG),
            "-vv" => args.level = Some(Level::TRACE),
            _ => positional.push(PathBuf::from(arg)),
        }
    }
    let mut positional = positional.into_iter();
    match (positional.next(), positional.next()) {
        (Some(vertex), Some(fragment)) => args.shaders = Some(ShaderPaths::new(vertex, fragment)),
        (None, None) => {}
        _ => anyhow::bail!("expected both a vertex and a fragment shader path"),
    }
    args.texture = positional.next();
    Ok(args)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = parse_args()?;
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.level.unwrap_or(Level::INFO))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let driver = HeadlessDriver::new();

    let mut program = match args.shaders {
        Some(paths) => Resource::from_paths(driver.clone(), paths)?,
        None => Resource::from_content(
            driver.clone(),
            [Stage::vertex(VERTEX), Stage::fragment(FRAGMENT)],
        )?,
    };
    if program.state() == ResourceState::FoundPath {
        program
            .load(LoadMode::Async)?
            .wait()
            .await
            .context("loading shaders")?;
    }
    program.compile()?;
    let report = program.get_log()?;
    report.write_to(std::io::stdout().lock())?;
    if let Err(err) = report.check() {
        error!("{err}");
    }
    let handle = program.link()?;
    info!(%handle, "Program ready");

    let vertices = Buffer::new(BufferCreateInfo {
        driver: driver.clone(),
        target: BufferTarget::Vertex,
        usage: BufferUsage::Static,
        data: glint::bytemuck::cast_slice(&TRIANGLE),
    })?;
    let mut vertex_array = VertexArray::new(driver.clone())?;
    let stride = 5 * std::mem::size_of::<f32>() as u32;
    let position = VertexAttribute::new(0, 2, AttributeFormat::F32).with_stride(stride);
    vertex_array.add_attribute(&vertices, position)?;
    vertex_array.add_attribute(
        &vertices,
        VertexAttribute::new(1, 3, AttributeFormat::F32)
            .with_stride(stride)
            .with_offset(position.size_bytes()),
    )?;

    let texture = match &args.texture {
        Some(path) => Some(
            glint_assets::image::load_texture(driver.clone(), path, Sampling::default())
                .with_context(|| format!("loading texture {}", path.display()))?,
        ),
        None => None,
    };
    if let Some(texture) = &texture {
        info!(
            width = texture.width(),
            height = texture.height(),
            channels = texture.channels(),
            "Texture ready"
        );
    }

    let mut timer = FrameTimer::new();
    for frame in 0..FRAMES {
        let delta = timer.tick();
        info!(frame, delta_ms = delta.as_secs_f64() * 1000.0, "Frame");
    }

    vertex_array.destroy();
    program.destroy()?;
    drop(texture);
    drop(vertices);
    info!(live = driver.live_objects(), "Released driver objects");
    for code in drain_errors(&driver) {
        error!(%code, "Driver error");
    }
    Ok(())
}
