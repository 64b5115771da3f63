//! Materials and the `.mat` loader.
//!
//! A [`Material`] is what a look assigns to a material slot: an effect name,
//! a list of textures and numeric attributes. Materials are produced by a
//! [`MaterialLoader`]; the bundled [`MatFileLoader`] reads the `.mat` text
//! form:
//!
//! ```text
//! material : "eut2.dif.spec" {
//!     texture : "paint.tobj"
//!     texture_name : "texture_base"
//!     diffuse : { 1.0 , 0.5 , 0.5 }
//!     shininess : 40
//! }
//! ```

use std::io::{self, Write};
use std::sync::Arc;

use crate::export::{HexList, EOL};
use crate::source::{directory_of, resolve_relative, AssetSource};
use crate::{Error, Result};

/// One texture reference of a material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialTexture {
    /// Sampler name, e.g. `texture_base`. May be empty.
    pub name: String,
    /// Virtual path of the texture object.
    pub path: String,
}

/// A numeric material attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialAttribute {
    pub name: String,
    pub values: Vec<f32>,
}

/// A decoded material.
#[derive(Debug, Clone)]
pub struct Material {
    path: String,
    effect: String,
    textures: Vec<MaterialTexture>,
    attributes: Vec<MaterialAttribute>,
    alias: Arc<str>,
}

impl Material {
    pub fn new(path: impl Into<String>, effect: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            effect: effect.into(),
            textures: Vec::new(),
            attributes: Vec::new(),
            alias: Arc::from(""),
        }
    }

    /// Placeholder for a material that failed to load.
    pub fn empty(path: impl Into<String>) -> Self {
        Self::new(path, "")
    }

    pub fn with_texture(mut self, name: impl Into<String>, path: impl Into<String>) -> Self {
        self.textures.push(MaterialTexture {
            name: name.into(),
            path: path.into(),
        });
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, values: Vec<f32>) -> Self {
        self.attributes.push(MaterialAttribute {
            name: name.into(),
            values,
        });
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn effect(&self) -> &str {
        &self.effect
    }

    pub fn textures(&self) -> &[MaterialTexture] {
        &self.textures
    }

    pub fn attributes(&self) -> &[MaterialAttribute] {
        &self.attributes
    }

    pub fn alias(&self) -> &Arc<str> {
        &self.alias
    }

    pub fn set_alias(&mut self, alias: Arc<str>) {
        self.alias = alias;
    }

    /// Write the short `Material { Alias Effect }` block used by geometry files.
    pub fn write_declaration<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write!(writer, "Material {{{EOL}")?;
        write!(writer, "\tAlias: \"{}\"{EOL}", self.alias)?;
        write!(writer, "\tEffect: \"{}\"{EOL}", self.effect)?;
        write!(writer, "}}{EOL}")
    }

    /// Write the full material definition used by trait files, each line
    /// prefixed with `indent`.
    pub fn write_definition<W: Write>(&self, writer: &mut W, indent: &str) -> io::Result<()> {
        write!(writer, "{indent}Material {{{EOL}")?;
        write!(writer, "{indent}\tAlias: \"{}\"{EOL}", self.alias)?;
        write!(writer, "{indent}\tEffect: \"{}\"{EOL}", self.effect)?;
        write!(writer, "{indent}\tFlags: 0{EOL}")?;
        write!(writer, "{indent}\tAttributeCount: {}{EOL}", self.attributes.len())?;
        write!(writer, "{indent}\tTextureCount: {}{EOL}", self.textures.len())?;

        for attribute in &self.attributes {
            let format = match attribute.values.len() {
                1 => "FLOAT".to_string(),
                n => format!("FLOAT{n}"),
            };
            write!(writer, "{indent}\tAttribute {{{EOL}")?;
            write!(writer, "{indent}\t\tFormat: {format}{EOL}")?;
            write!(writer, "{indent}\t\tTag: \"{}\"{EOL}", attribute.name)?;
            write!(writer, "{indent}\t\tValue: ( {} ){EOL}", HexList(&attribute.values))?;
            write!(writer, "{indent}\t}}{EOL}")?;
        }

        for (i, texture) in self.textures.iter().enumerate() {
            write!(writer, "{indent}\tTexture {{{EOL}")?;
            write!(writer, "{indent}\t\tTag: \"texture[{i}]:{}\"{EOL}", texture.name)?;
            write!(writer, "{indent}\t\tValue: \"{}\"{EOL}", texture.path)?;
            write!(writer, "{indent}\t}}{EOL}")?;
        }

        write!(writer, "{indent}}}{EOL}")
    }
}

/// Alias of the material in `slot`, derived from its first texture path.
///
/// The texture's five-character extension (`.tobj`) and any directory are
/// stripped: `/vehicle/paint.tobj` in slot 2 gives `mat_0002_paint`.
pub fn material_alias(slot: usize, material: &Material) -> String {
    let Some(texture) = material.textures().first() else {
        return format!("mat_{slot:04}");
    };

    let path = texture.path.as_str();
    let stem = path
        .len()
        .checked_sub(5)
        .filter(|cut| path.is_char_boundary(*cut))
        .map_or(path, |cut| &path[..cut]);
    let name = stem.rfind('/').map_or(stem, |slash| &stem[slash + 1..]);

    format!("mat_{slot:04}_{name}")
}

/// Produces materials from their virtual paths.
pub trait MaterialLoader: Sync {
    fn load(&self, source: &dyn AssetSource, path: &str) -> Result<Material>;
}

/// Loader for the `.mat` text format.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatFileLoader;

impl MaterialLoader for MatFileLoader {
    fn load(&self, source: &dyn AssetSource, path: &str) -> Result<Material> {
        if !source.exists(path) {
            return Err(Error::Material {
                path: path.to_string(),
                message: "file not found".into(),
            });
        }
        let data = source.read(path)?;
        let text = String::from_utf8_lossy(&data);
        parse_mat(path, &text)
    }
}

/// Texture slot collected while parsing; names and paths may arrive in any order.
#[derive(Default)]
struct TextureSlot {
    name: Option<String>,
    path: Option<String>,
}

fn parse_mat(path: &str, text: &str) -> Result<Material> {
    let directory = directory_of(path);
    let mut lines = text
        .lines()
        .map(|line| line.split("//").next().unwrap_or_default().trim())
        .filter(|line| !line.is_empty());

    let effect = lines
        .next()
        .and_then(|line| {
            let (key, value) = line.split_once(':')?;
            let key = key.trim();
            (key == "material" || key == "effect").then(|| unquote(value.trim_end_matches('{')))
        })
        .ok_or_else(|| Error::Material {
            path: path.to_string(),
            message: "missing material declaration".into(),
        })?;

    let mut material = Material::new(path, effect);
    let mut slots: Vec<TextureSlot> = Vec::new();
    // Texture block of the nested form: `texture : "name" { source : "path" }`.
    let mut open_texture: Option<usize> = None;

    for line in lines {
        if line == "}" {
            open_texture = None;
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();

        if let Some(slot) = open_texture {
            if key == "source" {
                slot_at(&mut slots, slot).path = Some(resolve_relative(directory, &unquote(value)));
            }
            continue;
        }

        if let Some(index) = indexed_key(key, "texture_name", slots.len()) {
            slot_at(&mut slots, index).name = Some(unquote(value));
        } else if let Some(index) = indexed_key(key, "texture", slots.len()) {
            if let Some(name) = value.strip_suffix('{') {
                slot_at(&mut slots, index).name = Some(unquote(name));
                open_texture = Some(index);
            } else {
                slot_at(&mut slots, index).path = Some(resolve_relative(directory, &unquote(value)));
            }
        } else if let Some(values) = parse_numbers(value) {
            material = material.with_attribute(key, values);
        }
    }

    for slot in slots {
        if let Some(texture_path) = slot.path {
            material = material.with_texture(slot.name.unwrap_or_default(), texture_path);
        }
    }

    Ok(material)
}

fn slot_at(slots: &mut Vec<TextureSlot>, index: usize) -> &mut TextureSlot {
    if slots.len() <= index {
        slots.resize_with(index + 1, TextureSlot::default);
    }
    &mut slots[index]
}

/// Match `base` or `base[i]`. A bare `texture` fills the next free slot; a
/// bare `texture_name` names the most recent one.
fn indexed_key(key: &str, base: &str, slot_count: usize) -> Option<usize> {
    let rest = key.strip_prefix(base)?;
    if rest.is_empty() {
        return Some(if base == "texture" {
            slot_count
        } else {
            slot_count.saturating_sub(1)
        });
    }
    rest.strip_prefix('[')?.strip_suffix(']')?.trim().parse().ok()
}

fn unquote(value: &str) -> String {
    value.trim().trim_matches('"').to_string()
}

/// Parse `1.5` or `{ 1 , 0.5 , 0 }`.
fn parse_numbers(value: &str) -> Option<Vec<f32>> {
    let inner = match value.strip_prefix('{') {
        Some(rest) => rest.strip_suffix('}')?,
        None => value,
    };
    inner
        .split(',')
        .map(|part| part.trim().parse::<f32>().ok())
        .collect::<Option<Vec<_>>>()
        .filter(|values| !values.is_empty())
}
