//! Skeleton container (`.pis`).

use std::io::{self, Write};

use super::{render_with, write_header, HexList, EOL};
use crate::Model;

const FORMAT_VERSION: u32 = 1;

/// Writes the skeleton container of a model.
pub struct PisWriter<'a> {
    model: &'a Model,
}

impl<'a> PisWriter<'a> {
    pub fn new(model: &'a Model) -> Self {
        Self { model }
    }

    /// Render the container into a string.
    pub fn render(&self) -> String {
        render_with(|out| self.write(out))
    }

    /// Write bone names, parents and rest matrices, one matrix row per line.
    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let model = self.model;
        let bones = model.bones();
        write_header(writer, FORMAT_VERSION, "Skeleton", model.file_name())?;

        write!(writer, "Global {{{EOL}")?;
        write!(writer, "\tBoneCount: {}{EOL}", bones.len())?;
        write!(writer, "}}{EOL}")?;

        write!(writer, "Bones {{{EOL}")?;
        for bone in bones {
            let parent = usize::try_from(bone.parent)
                .ok()
                .and_then(|parent| model.bone(parent))
                .map_or("", |parent| parent.name.as_str());
            let m = &bone.transformation;
            let row = |r: usize| [m[0][r], m[1][r], m[2][r], m[3][r]];

            write!(writer, "\t{:<5} ( Name:  \"{}\"{EOL}", bone.index, bone.name)?;
            write!(writer, "\t\t   Parent: \"{parent}\"{EOL}")?;
            write!(writer, "\t\t   Matrix: ( {}{EOL}", HexList(&row(0)))?;
            write!(writer, "\t\t             {}{EOL}", HexList(&row(1)))?;
            write!(writer, "\t\t             {}{EOL}", HexList(&row(2)))?;
            write!(writer, "\t\t             {} ){EOL}", HexList(&row(3)))?;
            write!(writer, "\t  ){EOL}")?;
        }
        write!(writer, "}}{EOL}")
    }
}
