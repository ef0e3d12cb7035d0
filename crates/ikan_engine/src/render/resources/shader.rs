//! Shaders and uniform reflection
//!
//! Shader sources are single files split into stages by `#type` markers:
//!
//! ```glsl
//! #type vertex
//! uniform mat4 u_ViewProjection;
//! ...
//! #type fragment
//! uniform sampler2D u_Textures[16];
//! ...
//! ```
//!
//! At creation the uniform declarations of every stage are parsed once.
//! Plain uniforms get byte offsets inside their stage's uniform buffer by
//! concatenation in declaration order; samplers get consecutive texture
//! registers. Materials resolve named writes through this table.

use std::path::Path;

use crate::render::api::{ShaderDataType, ShaderDomain, ShaderHandle, ShaderStageSource};
use crate::render::command_queue::RenderContext;
use crate::render::{RenderError, RenderResult};

/// A plain (non-sampler) uniform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderUniformDeclaration {
    /// Uniform name
    pub name: String,
    /// Element type
    pub ty: ShaderDataType,
    /// Array length, 1 for scalars
    pub count: u32,
    /// Byte offset inside the stage's uniform buffer
    pub offset: u32,
    /// Total size in bytes (`ty.size() * count`)
    pub size: u32,
    /// Stage the uniform was declared in
    pub domain: ShaderDomain,
}

/// Sampler kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderResourceType {
    /// `sampler2D`
    Texture2D,
    /// `samplerCube`
    TextureCube,
}

/// A sampler uniform bound through texture registers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderResourceDeclaration {
    /// Uniform name
    pub name: String,
    /// Sampler kind
    pub ty: ShaderResourceType,
    /// First texture register
    pub register: u32,
    /// Array length, 1 for single samplers
    pub count: u32,
}

/// Uniform buffer layout of one stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderUniformBufferDeclaration {
    /// Stage
    pub domain: ShaderDomain,
    /// Total size in bytes
    pub size: u32,
    /// Uniforms in declaration order
    pub uniforms: Vec<ShaderUniformDeclaration>,
}

impl ShaderUniformBufferDeclaration {
    fn empty(domain: ShaderDomain) -> Self {
        Self {
            domain,
            size: 0,
            uniforms: Vec::new(),
        }
    }

    fn push(&mut self, name: String, ty: ShaderDataType, count: u32) {
        let size = ty.size() * count;
        self.uniforms.push(ShaderUniformDeclaration {
            name,
            ty,
            count,
            offset: self.size,
            size,
            domain: self.domain,
        });
        self.size += size;
    }
}

/// Uniform declarations of every stage of a shader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderReflection {
    buffers: [ShaderUniformBufferDeclaration; 3],
    resources: Vec<ShaderResourceDeclaration>,
    next_register: u32,
}

impl ShaderReflection {
    /// Parse the uniform declarations of all stages
    ///
    /// # Panics
    /// On a uniform of a type the engine cannot lay out, or an array size
    /// that is not an integer literal.
    pub fn parse(stages: &[ShaderStageSource]) -> Self {
        let mut reflection = Self {
            buffers: ShaderDomain::ALL.map(ShaderUniformBufferDeclaration::empty),
            resources: Vec::new(),
            next_register: 0,
        };
        for stage in stages {
            reflection.parse_stage(stage.domain, &stage.source);
        }
        reflection
    }

    fn parse_stage(&mut self, domain: ShaderDomain, source: &str) {
        let stripped = strip_comments(source);
        let tokens = tokenize(&stripped);
        let mut cursor = 0;

        while cursor < tokens.len() {
            if tokens[cursor] != "uniform" {
                cursor += 1;
                continue;
            }
            cursor += 1;
            skip_precision(&tokens, &mut cursor);

            let Some(type_name) = tokens.get(cursor).copied() else { break };
            cursor += 1;

            if tokens.get(cursor).copied() == Some("{") {
                // uniform Block { members } [instance];
                cursor += 1;
                while cursor < tokens.len() && tokens[cursor] != "}" {
                    skip_precision(&tokens, &mut cursor);
                    let Some(member_type) = tokens.get(cursor).copied() else { break };
                    cursor += 1;
                    self.parse_declarators(domain, member_type, &tokens, &mut cursor);
                }
                while cursor < tokens.len() && tokens[cursor] != ";" {
                    cursor += 1;
                }
                cursor += 1;
            } else {
                self.parse_declarators(domain, type_name, &tokens, &mut cursor);
            }
        }
    }

    /// Parse `name [N]? (, name [N]?)* ;` for one type
    fn parse_declarators(&mut self, domain: ShaderDomain, type_name: &str, tokens: &[&str], cursor: &mut usize) {
        loop {
            let Some(name) = tokens.get(*cursor).copied() else { return };
            *cursor += 1;

            let mut count = 1;
            if tokens.get(*cursor).copied() == Some("[") {
                let literal = tokens.get(*cursor + 1).copied().unwrap_or("");
                count = literal
                    .parse::<u32>()
                    .unwrap_or_else(|_| panic!("array size of uniform '{name}' must be an integer literal, got '{literal}'"));
                *cursor += 3;
            }

            self.declare(domain, type_name, name, count);

            match tokens.get(*cursor).copied() {
                Some(",") => *cursor += 1,
                Some(";") => {
                    *cursor += 1;
                    return;
                }
                _ => return,
            }
        }
    }

    fn declare(&mut self, domain: ShaderDomain, type_name: &str, name: &str, count: u32) {
        let resource_type = match type_name {
            "sampler2D" => Some(ShaderResourceType::Texture2D),
            "samplerCube" => Some(ShaderResourceType::TextureCube),
            _ => None,
        };

        if let Some(ty) = resource_type {
            // the same sampler may be declared in several stages
            if self.find_resource(name).is_none() {
                self.resources.push(ShaderResourceDeclaration {
                    name: name.to_string(),
                    ty,
                    register: self.next_register,
                    count,
                });
                self.next_register += count;
            }
            return;
        }

        let ty = ShaderDataType::from_glsl(type_name)
            .unwrap_or_else(|| panic!("unsupported uniform type '{type_name}' for '{name}'"));
        self.buffers[domain.index()].push(name.to_string(), ty, count);
    }

    /// Find a plain uniform, searching stages in pipeline order
    pub fn find_uniform(&self, name: &str) -> Option<&ShaderUniformDeclaration> {
        self.buffers
            .iter()
            .flat_map(|buffer| buffer.uniforms.iter())
            .find(|uniform| uniform.name == name)
    }

    /// Find a sampler uniform
    pub fn find_resource(&self, name: &str) -> Option<&ShaderResourceDeclaration> {
        self.resources.iter().find(|resource| resource.name == name)
    }

    /// Uniform buffer layout of a stage
    pub fn uniform_buffer(&self, domain: ShaderDomain) -> &ShaderUniformBufferDeclaration {
        &self.buffers[domain.index()]
    }

    /// All sampler uniforms
    pub fn resources(&self) -> &[ShaderResourceDeclaration] {
        &self.resources
    }

    /// Number of texture registers used
    pub fn register_count(&self) -> u32 {
        self.next_register
    }
}

fn skip_precision(tokens: &[&str], cursor: &mut usize) {
    while matches!(tokens.get(*cursor).copied(), Some("lowp" | "mediump" | "highp")) {
        *cursor += 1;
    }
}

fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '/' && chars.peek() == Some(&'/') {
            for next in chars.by_ref() {
                if next == '\n' {
                    out.push('\n');
                    break;
                }
            }
        } else if c == '/' && chars.peek() == Some(&'*') {
            chars.next();
            let mut previous = '\0';
            for next in chars.by_ref() {
                if previous == '*' && next == '/' {
                    break;
                }
                previous = next;
            }
            out.push(' ');
        } else {
            out.push(c);
        }
    }
    out
}

fn tokenize(source: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = None;
    for (i, c) in source.char_indices() {
        let is_word = c.is_alphanumeric() || c == '_' || c == '#' || c == '.';
        if is_word {
            start.get_or_insert(i);
            continue;
        }
        if let Some(s) = start.take() {
            tokens.push(&source[s..i]);
        }
        if !c.is_whitespace() {
            tokens.push(&source[i..i + c.len_utf8()]);
        }
    }
    if let Some(s) = start {
        tokens.push(&source[s..]);
    }
    tokens
}

/// Split a single-file shader into stages on `#type <stage>` lines
///
/// # Panics
/// On an unknown stage name or a source with no `#type` marker.
pub fn split_stages(source: &str) -> Vec<ShaderStageSource> {
    const MARKER: &str = "#type";
    let mut stages: Vec<ShaderStageSource> = Vec::new();

    for line in source.lines() {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix(MARKER) {
            let domain = match rest.trim() {
                "vertex" => ShaderDomain::Vertex,
                "fragment" | "pixel" => ShaderDomain::Fragment,
                "geometry" => ShaderDomain::Geometry,
                other => panic!("unknown shader stage '{other}'"),
            };
            stages.push(ShaderStageSource {
                domain,
                source: String::new(),
            });
            continue;
        }
        // text before the first marker belongs to no stage
        let Some(stage) = stages.last_mut() else { continue };
        stage.source.push_str(line);
        stage.source.push('\n');
    }

    assert!(!stages.is_empty(), "shader source has no '{MARKER}' marker");
    stages
}

/// Compiled shader program plus its uniform reflection
pub struct Shader {
    context: RenderContext,
    handle: ShaderHandle,
    name: String,
    reflection: ShaderReflection,
}

impl Shader {
    /// Build a shader from single-file source
    pub fn from_source(context: &RenderContext, name: &str, source: &str) -> Self {
        let stages = split_stages(source);
        let reflection = ShaderReflection::parse(&stages);
        let handle = ShaderHandle(context.allocate_id());

        log::debug!(
            "Shader '{}': {} stage(s), {} sampler register(s)",
            name,
            stages.len(),
            reflection.register_count()
        );

        let program_name = name.to_string();
        context.submit(move |gpu| gpu.create_shader(handle, &program_name, &stages));

        Self {
            context: context.clone(),
            handle,
            name: name.to_string(),
            reflection,
        }
    }

    /// Load a single-file shader; the name is the file stem
    pub fn from_file(context: &RenderContext, path: impl AsRef<Path>) -> RenderResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| RenderError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let name = path
            .file_stem()
            .map_or_else(|| "shader".to_string(), |stem| stem.to_string_lossy().into_owned());
        Ok(Self::from_source(context, &name, &source))
    }

    /// Make this program current
    pub fn bind(&self) {
        let handle = self.handle;
        self.context.submit(move |gpu| gpu.bind_shader(handle));
    }

    /// Push a whole uniform buffer for one stage
    pub fn upload_uniform_block(&self, domain: ShaderDomain, data: &[u8]) {
        let handle = self.handle;
        let data = data.to_vec();
        self.context.submit(move |gpu| gpu.upload_uniform_block(handle, domain, &data));
    }

    /// Backend handle
    pub fn handle(&self) -> ShaderHandle {
        self.handle
    }

    /// Debug name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parsed uniform declarations
    pub fn reflection(&self) -> &ShaderReflection {
        &self.reflection
    }
}

impl std::fmt::Debug for Shader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shader")
            .field("handle", &self.handle)
            .field("name", &self.name)
            .finish()
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        let handle = self.handle;
        self.context.submit(move |gpu| gpu.destroy_shader(handle));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r"
#type vertex
#version 450 core
layout(location = 0) in vec3 a_Position;
uniform mat4 u_ViewProjection; // camera
uniform float u_Time, u_Scale;
/* uniform vec4 u_Disabled; */
void main() { gl_Position = u_ViewProjection * vec4(a_Position, 1.0); }

#type fragment
#version 450 core
uniform vec4 u_Color;
uniform sampler2D u_Textures[16];
uniform Lighting {
    vec3 u_LightDirection;
    highp float u_Intensity;
};
uniform sampler2D u_Mask;
out vec4 color;
void main() { color = u_Color; }
";

    fn reflect() -> ShaderReflection {
        ShaderReflection::parse(&split_stages(SOURCE))
    }

    #[test]
    fn test_split_stages() {
        let stages = split_stages(SOURCE);
        assert_eq!(stages.len(), 2);
        assert_eq!(stages[0].domain, ShaderDomain::Vertex);
        assert_eq!(stages[1].domain, ShaderDomain::Fragment);
        assert!(stages[1].source.contains("u_Textures"));
        assert!(!stages[0].source.contains("#type"));
    }

    #[test]
    fn test_offsets_concatenate_in_declaration_order() {
        let reflection = reflect();

        let vertex = reflection.uniform_buffer(ShaderDomain::Vertex);
        let names: Vec<&str> = vertex.uniforms.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["u_ViewProjection", "u_Time", "u_Scale"]);
        assert_eq!(vertex.uniforms[1].offset, 64);
        assert_eq!(vertex.uniforms[2].offset, 68);
        assert_eq!(vertex.size, 72);

        let fragment = reflection.uniform_buffer(ShaderDomain::Fragment);
        let intensity = reflection.find_uniform("u_Intensity").unwrap();
        assert_eq!(intensity.domain, ShaderDomain::Fragment);
        assert_eq!(intensity.offset, 16 + 12);
        assert_eq!(fragment.size, 16 + 12 + 4);
        assert!(reflection.find_uniform("u_Disabled").is_none());
    }

    #[test]
    fn test_samplers_get_consecutive_registers() {
        let reflection = reflect();
        let textures = reflection.find_resource("u_Textures").unwrap();
        assert_eq!((textures.register, textures.count), (0, 16));
        let mask = reflection.find_resource("u_Mask").unwrap();
        assert_eq!((mask.register, mask.count), (16, 1));
        assert_eq!(reflection.register_count(), 17);
        assert!(reflection.find_uniform("u_Mask").is_none());
    }

    #[test]
    #[should_panic(expected = "unsupported uniform type")]
    fn test_unknown_type_panics() {
        ShaderReflection::parse(&split_stages("#type vertex\nuniform Light u_Light;\n"));
    }

    #[test]
    fn test_shader_creation_is_queued() {
        let context = RenderContext::new();
        let shader = Shader::from_source(&context, "test", SOURCE);
        assert_eq!(context.pending_commands(), 1);

        let mut backend = crate::render::backends::HeadlessBackend::new();
        context.execute(&mut backend);
        assert_eq!(backend.shader(shader.handle()).unwrap().name, "test");
    }
}
