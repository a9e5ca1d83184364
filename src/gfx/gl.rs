use anyhow::{anyhow, bail, Result};
use glow::HasContext;

/// Flat-colour 2D shader: positions in surface pixels, y down.
pub const VERTEX_SHADER: &str = r#"
attribute vec2 aPos;
uniform vec2 uViewport;

void main() {
    vec2 ndc = (aPos / uViewport) * 2.0 - 1.0;
    gl_Position = vec4(ndc.x, -ndc.y, 0.0, 1.0);
}
"#;

pub const FRAGMENT_SHADER: &str = r#"
precision mediump float;
uniform vec4 uColor;

void main() {
    gl_FragColor = uColor;
}
"#;

fn compile_shader(gl: &glow::Context, shader_type: u32, source: &str) -> Result<glow::Shader> {
    unsafe {
        let shader = gl
            .create_shader(shader_type)
            .map_err(|e| anyhow!("Failed to create shader: {}", e))?;
        gl.shader_source(shader, source);
        gl.compile_shader(shader);

        if !gl.get_shader_compile_status(shader) {
            let info = gl.get_shader_info_log(shader);
            gl.delete_shader(shader);
            let kind = if shader_type == glow::VERTEX_SHADER { "vertex" } else { "fragment" };
            bail!("{} shader compilation failed: {}", kind, info);
        }

        Ok(shader)
    }
}

/// Compiles and links the built-in flat-colour program.
pub fn flat_color_program(gl: &glow::Context) -> Result<glow::Program> {
    let vertex = compile_shader(gl, glow::VERTEX_SHADER, VERTEX_SHADER)?;
    let fragment = compile_shader(gl, glow::FRAGMENT_SHADER, FRAGMENT_SHADER)?;

    unsafe {
        let program = gl
            .create_program()
            .map_err(|e| anyhow!("Failed to create program: {}", e))?;
        gl.attach_shader(program, vertex);
        gl.attach_shader(program, fragment);
        gl.link_program(program);

        let linked = gl.get_program_link_status(program);
        gl.detach_shader(program, vertex);
        gl.detach_shader(program, fragment);
        gl.delete_shader(vertex);
        gl.delete_shader(fragment);

        if !linked {
            let info = gl.get_program_info_log(program);
            gl.delete_program(program);
            bail!("Program linking failed: {}", info);
        }

        Ok(program)
    }
}
