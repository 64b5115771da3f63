//! The model aggregate: everything decoded from one descriptor/geometry pair.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::bone::Bone;
use crate::companion::{Companion, CompanionLoader};
use crate::descriptor::{self, DescriptorContext};
use crate::error::{Error, Result};
use crate::export::{output_path, write_file, PimWriter, PisWriter, PitWriter};
use crate::geometry;
use crate::look::Look;
use crate::material::MaterialLoader;
use crate::mesh::Piece;
use crate::part::{Locator, Part};
use crate::source::{directory_of, file_name_of, AssetSource};
use crate::variant::Variant;
use crate::warning::Warning;

/// Collaborators used by [`Model::load`].
#[derive(Clone, Copy)]
pub struct LoadContext<'a> {
    pub source: &'a dyn AssetSource,
    pub materials: &'a dyn MaterialLoader,
    pub collision: Option<&'a dyn CompanionLoader>,
    pub prefab: Option<&'a dyn CompanionLoader>,
}

impl<'a> LoadContext<'a> {
    /// Context without companion loaders.
    pub fn new(source: &'a dyn AssetSource, materials: &'a dyn MaterialLoader) -> Self {
        Self {
            source,
            materials,
            collision: None,
            prefab: None,
        }
    }

    pub fn with_collision(mut self, loader: &'a dyn CompanionLoader) -> Self {
        self.collision = Some(loader);
        self
    }

    pub fn with_prefab(mut self, loader: &'a dyn CompanionLoader) -> Self {
        self.prefab = Some(loader);
        self
    }
}

/// Which containers an export produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub geometry: bool,
    pub traits: bool,
    pub skeleton: bool,
    pub collision: bool,
    pub prefab: bool,
}

impl fmt::Display for ExportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let yes_no = |done: bool| if done { "yes" } else { "no" };
        write!(
            f,
            "pim:{} pit:{} pis:{} pic:{} pip:{}",
            yes_no(self.geometry),
            yes_no(self.traits),
            yes_no(self.skeleton),
            yes_no(self.collision),
            yes_no(self.prefab),
        )
    }
}

/// A decoded model.
///
/// A model starts empty, is filled by [`load`](Model::load) and emptied again
/// by [`destroy`](Model::destroy). Loading a loaded model destroys it first.
///
/// # Example
///
/// ```no_run
/// use prism_model::{DirectorySource, LoadContext, MatFileLoader, Model};
///
/// let source = DirectorySource::new("/data/base");
/// let mut model = Model::new();
/// model.load(&LoadContext::new(&source, &MatFileLoader), "/vehicle/truck/cab")?;
/// let report = model.export("/data/export".as_ref());
/// println!("{report}");
/// # Ok::<(), prism_model::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct Model {
    file_path: String,
    directory: String,
    file_name: String,
    material_count: u32,
    bones: Vec<Bone>,
    locators: Vec<Locator>,
    parts: Vec<Part>,
    pieces: Vec<Piece>,
    looks: Vec<Look>,
    variants: Vec<Variant>,
    aliases: Vec<Arc<str>>,
    warnings: Vec<Warning>,
    collision: Option<Box<dyn Companion>>,
    prefab: Option<Box<dyn Companion>>,
    loaded: bool,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the model at virtual path `path` (without extension).
    ///
    /// Reads `path.pmd` and `path.pmg`; a failure in either aborts the load.
    /// Collision (`.pmc`) and prefab (`.ppd`) companions are loaded best effort
    /// when the context carries a loader for them.
    pub fn load(&mut self, ctx: &LoadContext<'_>, path: &str) -> Result<()> {
        if self.loaded {
            self.destroy();
        }

        self.file_path = path.to_string();
        self.directory = directory_of(path).to_string();
        self.file_name = file_name_of(path).to_string();

        let descriptor_path = format!("{path}.pmd");
        let data = ctx
            .source
            .read(&descriptor_path)
            .map_err(|err| Error::from(err).in_file(&descriptor_path))?;
        let descriptor = descriptor::decode(
            &data,
            &DescriptorContext {
                directory: &self.directory,
                source: ctx.source,
                materials: ctx.materials,
            },
        )
        .map_err(|err| err.in_file(&descriptor_path))?;
        log_warnings(&descriptor.warnings, &descriptor_path);

        let geometry_path = format!("{path}.pmg");
        let data = ctx
            .source
            .read(&geometry_path)
            .map_err(|err| Error::from(err).in_file(&geometry_path))?;
        let geometry = geometry::decode(&data).map_err(|err| err.in_file(&geometry_path))?;
        drop(data);
        log_warnings(&geometry.warnings, &geometry_path);

        if descriptor.part_count != geometry.parts.len() {
            return Err(Error::PartCountMismatch {
                descriptor: descriptor.part_count,
                geometry: geometry.parts.len(),
            }
            .in_file(path));
        }

        self.material_count = descriptor.material_count;
        self.looks = descriptor.looks;
        self.variants = descriptor.variants;
        self.aliases = descriptor.aliases;
        self.warnings = descriptor.warnings;
        self.bones = geometry.bones;
        self.parts = geometry.parts;
        self.locators = geometry.locators;
        self.pieces = geometry.pieces;
        self.warnings.extend(geometry.warnings);

        self.prefab = self.load_companion(ctx.source, ctx.prefab, "ppd", "prefab");
        self.collision = self.load_companion(ctx.source, ctx.collision, "pmc", "collision");

        self.loaded = true;
        tracing::debug!(
            path,
            pieces = self.pieces.len(),
            bones = self.bones.len(),
            warnings = self.warnings.len(),
            "loaded model"
        );
        Ok(())
    }

    fn load_companion(
        &mut self,
        source: &dyn AssetSource,
        loader: Option<&dyn CompanionLoader>,
        extension: &str,
        kind: &'static str,
    ) -> Option<Box<dyn Companion>> {
        let loader = loader?;
        let path = format!("{}.{extension}", self.file_path);
        if !source.exists(&path) {
            tracing::debug!(path = %path, "no {kind} file");
            return None;
        }

        match loader.load(source, &self.file_path) {
            Ok(companion) => Some(companion),
            Err(err) => {
                let warning = Warning::CompanionLoad {
                    kind,
                    message: err.to_string(),
                };
                warning.log(&path);
                self.warnings.push(warning);
                None
            }
        }
    }

    /// Release all decoded data and return to the empty state.
    pub fn destroy(&mut self) {
        *self = Self::default();
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn bone(&self, index: usize) -> Option<&Bone> {
        self.bones.get(index)
    }

    pub fn locators(&self) -> &[Locator] {
        &self.locators
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn looks(&self) -> &[Look] {
        &self.looks
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    /// Material alias per slot, shared with every look's materials.
    pub fn aliases(&self) -> &[Arc<str>] {
        &self.aliases
    }

    /// Recoverable problems met during the last load.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn material_count(&self) -> u32 {
        self.material_count
    }

    pub fn vertex_count(&self) -> usize {
        self.pieces.iter().map(|piece| piece.vertices().len()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.pieces.iter().map(|piece| piece.triangles().len()).sum()
    }

    /// Vertices of skinned pieces.
    pub fn skin_vertex_count(&self) -> usize {
        self.pieces
            .iter()
            .filter(|piece| piece.is_skinned())
            .map(|piece| piece.vertices().len())
            .sum()
    }

    /// Virtual path the model was loaded from, without extension.
    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    pub fn directory(&self) -> &str {
        &self.directory
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn collision(&self) -> Option<&dyn Companion> {
        self.collision.as_deref()
    }

    pub fn prefab(&self) -> Option<&dyn Companion> {
        self.prefab.as_deref()
    }

    /// Write the geometry container and return its path.
    pub fn save_geometry(&self, export_root: &Path) -> Result<PathBuf> {
        let path = self.output(export_root, "pim")?;
        write_file(&path, |w| PimWriter::new(self).write(w))?;
        Ok(path)
    }

    /// Write the traits container and return its path.
    pub fn save_traits(&self, export_root: &Path) -> Result<PathBuf> {
        let path = self.output(export_root, "pit")?;
        write_file(&path, |w| PitWriter::new(self).write(w))?;
        Ok(path)
    }

    /// Write the skeleton container. Models without bones produce nothing.
    pub fn save_skeleton(&self, export_root: &Path) -> Result<Option<PathBuf>> {
        if self.bones.is_empty() {
            return Ok(None);
        }
        let path = self.output(export_root, "pis")?;
        write_file(&path, |w| PisWriter::new(self).write(w))?;
        Ok(Some(path))
    }

    fn output(&self, export_root: &Path, extension: &str) -> Result<PathBuf> {
        if !self.loaded {
            return Err(Error::NotLoaded);
        }
        Ok(output_path(export_root, &self.file_path, extension))
    }

    /// Write every container. A failing container does not stop the others.
    pub fn export(&self, export_root: &Path) -> ExportReport {
        let file = self.file_path.as_str();
        let report = ExportReport {
            geometry: logged_failure(file, "pim", self.save_geometry(export_root)).is_some(),
            traits: logged_failure(file, "pit", self.save_traits(export_root)).is_some(),
            skeleton: logged_failure(file, "pis", self.save_skeleton(export_root))
                .flatten()
                .is_some(),
            collision: self
                .collision
                .as_ref()
                .and_then(|companion| logged_failure(file, "pic", companion.save(export_root)))
                .is_some(),
            prefab: self
                .prefab
                .as_ref()
                .and_then(|companion| logged_failure(file, "pip", companion.save(export_root)))
                .is_some(),
        };

        tracing::info!(
            "{}: {report}. vertices: {} materials: {}",
            self.file_name,
            self.vertex_count(),
            self.material_count,
        );
        report
    }
}

/// Log a failed export step and drop its error.
fn logged_failure<T>(file: &str, container: &str, result: Result<T>) -> Option<T> {
    result
        .map_err(|err| tracing::error!(file, container, "export failed: {err}"))
        .ok()
}

fn log_warnings(warnings: &[Warning], file: &str) {
    for warning in warnings {
        warning.log(file);
    }
}
