use std::path::PathBuf;

pub const VERTEX: &str = "#version 330 core\nlayout (location = 0) in vec3 pos;\nvoid main() { gl_Position = vec4(pos, 1.0); }\n";
pub const FRAGMENT: &str = "#version 330 core\nout vec4 colour;\nvoid main() { colour = vec4(1.0); }\n";

pub fn write_shader(dir: &tempfile::TempDir, name: &str, source: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, source).unwrap();
    path
}
