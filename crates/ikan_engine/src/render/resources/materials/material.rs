//! Materials and material instances
//!
//! A [`Material`] pairs a shader with one uniform byte buffer per shader
//! stage, sized from the shader's reflection. Named writes resolve to
//! `(offset, size, domain)` through that reflection and land in the matching
//! buffer; [`Material::bind`] then pushes each non-empty buffer in one upload.
//!
//! A [`MaterialInstance`] starts as a copy of its base material's buffers and
//! only diverges where it is explicitly overridden.

use std::collections::HashSet;
use std::rc::Rc;

use crate::render::api::ShaderDomain;
use crate::render::resources::shader::{Shader, ShaderResourceDeclaration, ShaderUniformDeclaration};
use crate::render::resources::texture::Texture2D;

/// Per-stage uniform bytes plus textures by register
#[derive(Clone)]
struct UniformStorage {
    buffers: [Vec<u8>; 3],
    textures: Vec<Option<Rc<Texture2D>>>,
}

impl UniformStorage {
    fn for_shader(shader: &Shader) -> Self {
        let reflection = shader.reflection();
        Self {
            buffers: ShaderDomain::ALL.map(|domain| vec![0u8; reflection.uniform_buffer(domain).size as usize]),
            textures: vec![None; reflection.register_count() as usize],
        }
    }

    fn write(&mut self, declaration: &ShaderUniformDeclaration, bytes: &[u8]) {
        assert!(
            bytes.len() <= declaration.size as usize,
            "write of {} bytes to uniform '{}' exceeds its declared size of {} bytes",
            bytes.len(),
            declaration.name,
            declaration.size
        );
        let start = declaration.offset as usize;
        self.buffers[declaration.domain.index()][start..start + bytes.len()].copy_from_slice(bytes);
    }

    fn read<T: bytemuck::Pod>(&self, declaration: &ShaderUniformDeclaration) -> T {
        let len = std::mem::size_of::<T>();
        assert!(
            len <= declaration.size as usize,
            "read of {} bytes from uniform '{}' exceeds its declared size of {} bytes",
            len,
            declaration.name,
            declaration.size
        );
        let start = declaration.offset as usize;
        bytemuck::pod_read_unaligned(&self.buffers[declaration.domain.index()][start..start + len])
    }

    fn set_texture(&mut self, resource: &ShaderResourceDeclaration, index: u32, texture: Rc<Texture2D>) {
        assert!(
            index < resource.count,
            "texture index {} out of range for '{}' ({} entries)",
            index,
            resource.name,
            resource.count
        );
        self.textures[(resource.register + index) as usize] = Some(texture);
    }

    fn bind(&self, shader: &Shader) {
        shader.bind();
        for domain in ShaderDomain::ALL {
            let buffer = &self.buffers[domain.index()];
            if !buffer.is_empty() {
                shader.upload_uniform_block(domain, buffer);
            }
        }
        for (register, texture) in self.textures.iter().enumerate() {
            if let Some(texture) = texture {
                texture.bind(register as u32);
            }
        }
    }
}

fn uniform<'a>(shader: &'a Shader, name: &str) -> &'a ShaderUniformDeclaration {
    shader
        .reflection()
        .find_uniform(name)
        .unwrap_or_else(|| panic!("uniform '{}' not found in shader '{}'", name, shader.name()))
}

fn resource<'a>(shader: &'a Shader, name: &str) -> &'a ShaderResourceDeclaration {
    shader
        .reflection()
        .find_resource(name)
        .unwrap_or_else(|| panic!("sampler '{}' not found in shader '{}'", name, shader.name()))
}

/// Shader plus its uniform values
pub struct Material {
    shader: Rc<Shader>,
    storage: UniformStorage,
}

impl Material {
    /// Create a material with zeroed uniforms
    pub fn new(shader: Rc<Shader>) -> Self {
        let storage = UniformStorage::for_shader(&shader);
        Self { shader, storage }
    }

    /// Write a uniform value
    ///
    /// # Panics
    /// If the shader declares no uniform `name`, or `T` is larger than the
    /// declaration.
    pub fn set<T: bytemuck::Pod>(&mut self, name: &str, value: T) {
        let declaration = uniform(&self.shader, name);
        self.storage.write(declaration, bytemuck::bytes_of(&value));
    }

    /// Read a uniform value back
    pub fn get<T: bytemuck::Pod>(&self, name: &str) -> T {
        self.storage.read(uniform(&self.shader, name))
    }

    /// Assign a texture to a single sampler uniform
    pub fn set_texture(&mut self, name: &str, texture: Rc<Texture2D>) {
        self.set_texture_at(name, 0, texture);
    }

    /// Assign a texture to one element of a sampler array
    pub fn set_texture_at(&mut self, name: &str, index: u32, texture: Rc<Texture2D>) {
        let declaration = resource(&self.shader, name);
        self.storage.set_texture(declaration, index, texture);
    }

    /// Whether the shader declares a plain uniform `name`
    pub fn has_uniform(&self, name: &str) -> bool {
        self.shader.reflection().find_uniform(name).is_some()
    }

    /// Bind the shader, upload every non-empty stage buffer and bind textures
    pub fn bind(&self) {
        self.storage.bind(&self.shader);
    }

    /// Uniform bytes of one stage
    pub fn uniform_buffer(&self, domain: ShaderDomain) -> &[u8] {
        &self.storage.buffers[domain.index()]
    }

    /// Shader the material draws with
    pub fn shader(&self) -> &Rc<Shader> {
        &self.shader
    }
}

impl std::fmt::Debug for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Material").field("shader", &self.shader.name()).finish()
    }
}

/// Per-object overrides on top of a shared material
pub struct MaterialInstance {
    material: Rc<Material>,
    storage: UniformStorage,
    overridden: HashSet<String>,
}

impl MaterialInstance {
    /// Snapshot the base material's current values
    pub fn new(material: &Rc<Material>) -> Self {
        Self {
            material: Rc::clone(material),
            storage: material.storage.clone(),
            overridden: HashSet::new(),
        }
    }

    /// Override a uniform value for this instance only
    pub fn set<T: bytemuck::Pod>(&mut self, name: &str, value: T) {
        let declaration = uniform(&self.material.shader, name);
        self.storage.write(declaration, bytemuck::bytes_of(&value));
        self.overridden.insert(name.to_string());
    }

    /// Read the instance's value of a uniform
    pub fn get<T: bytemuck::Pod>(&self, name: &str) -> T {
        self.storage.read(uniform(&self.material.shader, name))
    }

    /// Override a texture for this instance only
    pub fn set_texture(&mut self, name: &str, texture: Rc<Texture2D>) {
        let declaration = resource(&self.material.shader, name);
        self.storage.set_texture(declaration, 0, texture);
        self.overridden.insert(name.to_string());
    }

    /// Whether `name` was set on this instance
    pub fn is_overridden(&self, name: &str) -> bool {
        self.overridden.contains(name)
    }

    /// Bind with this instance's values
    pub fn bind(&self) {
        self.storage.bind(&self.material.shader);
    }

    /// Uniform bytes of one stage
    pub fn uniform_buffer(&self, domain: ShaderDomain) -> &[u8] {
        &self.storage.buffers[domain.index()]
    }

    /// Base material
    pub fn material(&self) -> &Rc<Material> {
        &self.material
    }
}
