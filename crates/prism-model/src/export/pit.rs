//! Traits container (`.pit`): looks and variants.

use std::io::{self, Write};

use super::{render_with, write_header, EOL};
use crate::variant::Attribute;
use crate::Model;

const FORMAT_VERSION: u32 = 1;

/// Writes the traits container of a model.
pub struct PitWriter<'a> {
    model: &'a Model,
}

impl<'a> PitWriter<'a> {
    pub fn new(model: &'a Model) -> Self {
        Self { model }
    }

    /// Render the container into a string.
    pub fn render(&self) -> String {
        render_with(|out| self.write(out))
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let model = self.model;
        write_header(writer, FORMAT_VERSION, "Trait", model.file_name())?;

        write!(writer, "Global {{{EOL}")?;
        write!(writer, "\tLookCount: {}{EOL}", model.looks().len())?;
        write!(writer, "\tVariantCount: {}{EOL}", model.variants().len())?;
        write!(writer, "\tPartCount: {}{EOL}", model.parts().len())?;
        write!(writer, "\tMaterialCount: {}{EOL}", model.material_count())?;
        write!(writer, "}}{EOL}")?;

        for look in model.looks() {
            write!(writer, "Look {{{EOL}")?;
            write!(writer, "\tName: \"{}\"{EOL}", look.name)?;
            for material in &look.materials {
                material.write_definition(writer, "\t")?;
            }
            write!(writer, "}}{EOL}")?;
        }

        for variant in model.variants() {
            write!(writer, "Variant {{{EOL}")?;
            write!(writer, "\tName: \"{}\"{EOL}", variant.name)?;
            for attributes in &variant.parts {
                let name = model
                    .parts()
                    .get(attributes.part)
                    .map_or("", |part| part.name.as_str());
                write!(writer, "\tPart {{{EOL}")?;
                write!(writer, "\t\tName: \"{name}\"{EOL}")?;
                write!(writer, "\t\tAttributeCount: {}{EOL}", attributes.attributes.len())?;
                for attribute in &attributes.attributes {
                    write_attribute(writer, attribute, "\t\t")?;
                }
                write!(writer, "\t}}{EOL}")?;
            }
            write!(writer, "}}{EOL}")?;
        }
        Ok(())
    }
}

fn write_attribute<W: Write>(writer: &mut W, attribute: &Attribute, indent: &str) -> io::Result<()> {
    write!(writer, "{indent}Attribute {{{EOL}")?;
    write!(writer, "{indent}\tFormat: {}{EOL}", attribute.value.format())?;
    write!(writer, "{indent}\tTag: \"{}\"{EOL}", attribute.name)?;
    write!(writer, "{indent}\tValue: ( {} ){EOL}", attribute.value)?;
    write!(writer, "{indent}}}{EOL}")
}
