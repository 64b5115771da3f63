//! Descriptor (`.pmd`) decoding.
//!
//! The descriptor holds what the geometry does not: looks (which material
//! goes into each slot) and variants (per-part attribute values). Variant
//! values are stored as one block per variant; each attribute definition
//! names an offset inside the block:
//!
//! ```text
//! value(variant, def) = attribs_value_offset + def.offset + variant * attribs_values_size
//! ```

use std::mem::size_of;
use std::sync::Arc;

use prism_common::{memchr, BinaryReader, Token};
use zerocopy::FromBytes;

use crate::error::{Container, Error, Result};
use crate::layout::pmd::{AttribDef, AttribLink, PmdHeader};
use crate::look::Look;
use crate::material::{material_alias, Material, MaterialLoader};
use crate::source::{resolve_relative, AssetSource};
use crate::variant::{Attribute, AttributeValue, PartAttributes, Variant};
use crate::warning::Warning;

/// Collaborators used while decoding a descriptor.
#[derive(Clone, Copy)]
pub struct DescriptorContext<'a> {
    /// Directory of the model, for relative material paths.
    pub directory: &'a str,
    pub source: &'a dyn AssetSource,
    pub materials: &'a dyn MaterialLoader,
}

/// Decoded contents of a descriptor file.
#[derive(Debug, Default)]
pub struct Descriptor {
    pub material_count: u32,
    pub part_count: usize,
    pub looks: Vec<Look>,
    pub variants: Vec<Variant>,
    /// Alias per material slot, shared by every look.
    pub aliases: Vec<Arc<str>>,
    pub warnings: Vec<Warning>,
}

/// Decode a descriptor file.
pub fn decode(data: &[u8], ctx: &DescriptorContext<'_>) -> Result<Descriptor> {
    let header: PmdHeader = record(data, "header", 0)?;
    let version = header.version;
    if version != PmdHeader::SUPPORTED_VERSION {
        return Err(Error::UnsupportedVersion {
            container: Container::Descriptor,
            expected: PmdHeader::SUPPORTED_VERSION.to_string(),
            actual: version.to_string(),
        });
    }

    let mut descriptor = Descriptor {
        material_count: header.material_count,
        part_count: header.part_count as usize,
        ..Descriptor::default()
    };

    let looks = decode_looks(data, &header, ctx, &mut descriptor)?;
    descriptor.looks = looks;
    descriptor.variants = decode_variants(data, &header, &mut descriptor.warnings)?;

    Ok(descriptor)
}

fn decode_looks(
    data: &[u8],
    header: &PmdHeader,
    ctx: &DescriptorContext<'_>,
    descriptor: &mut Descriptor,
) -> Result<Vec<Look>> {
    let look_count = header.look_count as usize;
    let material_count = header.material_count as usize;
    let look_offset = header.look_offset;
    let material_offset = header.material_offset;

    check_table::<Token>(data, "look names", look_offset, look_count)?;
    let slot_count = look_count
        .checked_mul(material_count)
        .ok_or_else(|| corrupt("material table", material_offset))?;
    check_table::<u32>(data, "material table", material_offset, slot_count)?;

    let mut looks = Vec::with_capacity(look_count);
    for i in 0..look_count {
        let name: Token = table_entry(data, "look name", look_offset, i)?;
        let mut materials = Vec::with_capacity(material_count);

        for slot in 0..material_count {
            let path_offset: u32 =
                table_entry(data, "material table", material_offset, i * material_count + slot)?;
            let path = material_path(data, path_offset)?;
            let path = resolve_relative(ctx.directory, &path);

            let mut material = load_material(ctx, &path, &mut descriptor.warnings);
            if i == 0 {
                descriptor.aliases.push(Arc::from(material_alias(slot, &material)));
            }
            material.set_alias(Arc::clone(&descriptor.aliases[slot]));
            materials.push(material);
        }

        looks.push(Look {
            name: name.to_string_lossy(),
            materials,
        });
    }
    Ok(looks)
}

/// NUL-terminated material path. Invalid UTF-8 is replaced so the material
/// loader reports it against its own slot.
fn material_path(data: &[u8], offset: u32) -> Result<String> {
    let bytes = data
        .get(offset as usize..)
        .ok_or_else(|| corrupt("material path", offset))?;
    let end = memchr::memchr(0, bytes).ok_or_else(|| corrupt("material path", offset))?;
    Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
}

fn load_material(ctx: &DescriptorContext<'_>, path: &str, warnings: &mut Vec<Warning>) -> Material {
    match ctx.materials.load(ctx.source, path) {
        Ok(material) => material,
        Err(err) => {
            warnings.push(Warning::MaterialLoad {
                path: path.to_string(),
                message: err.to_string(),
            });
            Material::empty(path)
        }
    }
}

fn decode_variants(
    data: &[u8],
    header: &PmdHeader,
    warnings: &mut Vec<Warning>,
) -> Result<Vec<Variant>> {
    let variant_count = header.variant_count as usize;
    if variant_count == 0 {
        return Ok(Vec::new());
    }

    let part_count = header.part_count as usize;
    let definition_count = header.attribs_count as usize;
    let variant_offset = header.variant_offset;
    let links_offset = header.part_attribs_offset;
    let definitions_offset = header.attribs_offset;

    check_table::<Token>(data, "variant names", variant_offset, variant_count)?;
    check_table::<AttribLink>(data, "attribute links", links_offset, part_count)?;
    let links = (0..part_count)
        .map(|j| table_entry::<AttribLink>(data, "attribute link", links_offset, j))
        .collect::<Result<Vec<_>>>()?;

    let mut variants = Vec::with_capacity(variant_count);
    for i in 0..variant_count {
        let name: Token = table_entry(data, "variant name", variant_offset, i)?;
        let name = name.to_string_lossy();
        let mut parts = Vec::with_capacity(part_count);

        for (j, link) in links.iter().enumerate() {
            let (from, to) = (link.from, link.to);
            let mut attributes = Vec::new();

            for k in from..to {
                let index = usize::try_from(k)
                    .ok()
                    .filter(|index| *index < definition_count)
                    .ok_or_else(|| Error::CorruptDescriptor {
                        what: format!("attribute definition index of part {j}"),
                        offset: i64::from(k),
                    })?;
                let definition: AttribDef =
                    table_entry(data, "attribute definition", definitions_offset, index)?;
                let attribute = definition.name.to_string_lossy();

                match definition.kind {
                    AttribDef::KIND_INT => {
                        let at = value_address(header, definition.offset, i)?;
                        let value = BinaryReader::new_at(data, at)
                            .read_i32()
                            .map_err(|_| corrupt_at("attribute value", at))?;
                        attributes.push(Attribute {
                            name: attribute,
                            value: AttributeValue::Int(value),
                        });
                    }
                    type_code => warnings.push(Warning::UnknownAttributeType {
                        variant: name.clone(),
                        part: j,
                        attribute,
                        type_code,
                    }),
                }
            }

            parts.push(PartAttributes { part: j, attributes });
        }

        variants.push(Variant { name, parts });
    }
    Ok(variants)
}

/// Address of a definition's value in the block of `variant`.
fn value_address(header: &PmdHeader, value_offset: i32, variant: usize) -> Result<usize> {
    let base = header.attribs_value_offset as usize;
    let block = header.attribs_values_size as usize;
    usize::try_from(value_offset)
        .ok()
        .and_then(|offset| base.checked_add(offset))
        .and_then(|offset| block.checked_mul(variant)?.checked_add(offset))
        .ok_or(Error::CorruptDescriptor {
            what: "attribute value offset".into(),
            offset: i64::from(value_offset),
        })
}

fn corrupt(what: &str, offset: u32) -> Error {
    corrupt_at(what, offset as usize)
}

fn corrupt_at(what: &str, offset: usize) -> Error {
    Error::CorruptDescriptor {
        what: what.to_string(),
        offset: offset as i64,
    }
}

fn record<T: FromBytes>(data: &[u8], what: &str, offset: usize) -> Result<T> {
    BinaryReader::new_at(data, offset)
        .read_struct()
        .map_err(|_| corrupt_at(what, offset))
}

fn table_entry<T: FromBytes>(data: &[u8], what: &str, base: u32, index: usize) -> Result<T> {
    let offset = index
        .checked_mul(size_of::<T>())
        .and_then(|offset| offset.checked_add(base as usize))
        .ok_or_else(|| corrupt(what, base))?;
    record(data, what, offset)
}

fn check_table<T>(data: &[u8], what: &str, base: u32, count: usize) -> Result<()> {
    let end = count
        .checked_mul(size_of::<T>())
        .and_then(|len| len.checked_add(base as usize));
    match end {
        Some(end) if count == 0 || end <= data.len() => Ok(()),
        _ => Err(corrupt(what, base)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::material::MatFileLoader;
    use crate::source::MemorySource;
    use crate::testutil::DescriptorBuilder;

    fn source() -> MemorySource {
        MemorySource::new()
            .with_file(
                "/vehicle/truck/paint.mat",
                "material : \"eut2.dif\" {\n\ttexture : \"paint.tobj\"\n}\n",
            )
            .with_file("/material/glass.mat", "material : \"eut2.glass\" {\n}\n")
    }

    fn decode_with(data: &[u8], source: &MemorySource) -> Result<Descriptor> {
        let ctx = DescriptorContext {
            directory: "/vehicle/truck",
            source,
            materials: &MatFileLoader,
        };
        decode(data, &ctx)
    }

    fn two_looks() -> DescriptorBuilder {
        DescriptorBuilder {
            looks: vec![
                ("default", vec!["paint.mat", "/material/glass.mat"]),
                ("rusty", vec!["paint_b.mat", "/material/glass.mat"]),
            ],
            part_count: 2,
            variants: vec!["default", "damaged"],
            links: vec![(0, 2), (2, 3)],
            definitions: vec![
                ("visible", AttribDef::KIND_INT, 0),
                ("dirt", AttribDef::KIND_INT, 4),
                ("odd", 3, 8),
            ],
            values: vec![vec![1, 5, 0], vec![0, 7, 0]],
            ..DescriptorBuilder::default()
        }
    }

    #[test]
    fn test_looks_and_aliases() {
        let descriptor = decode_with(&two_looks().build(), &source()).unwrap();

        assert_eq!(descriptor.material_count, 2);
        assert_eq!(descriptor.looks.len(), 2);
        assert_eq!(descriptor.looks[1].name, "rusty");

        let default = &descriptor.looks[0];
        assert_eq!(default.materials[0].path(), "/vehicle/truck/paint.mat");
        assert_eq!(default.materials[0].effect(), "eut2.dif");
        assert_eq!(&**default.materials[0].alias(), "mat_0000_paint");
        assert_eq!(&**default.materials[1].alias(), "mat_0001");

        // later looks share the aliases of look 0, even for a material that failed to load
        let rusty = &descriptor.looks[1];
        assert_eq!(rusty.materials[0].effect(), "");
        for slot in 0..2 {
            assert!(Arc::ptr_eq(rusty.materials[slot].alias(), default.materials[slot].alias()));
            assert!(Arc::ptr_eq(rusty.materials[slot].alias(), &descriptor.aliases[slot]));
        }
    }

    #[test]
    fn test_missing_material_warns() {
        let descriptor = decode_with(&two_looks().build(), &source()).unwrap();

        let missing: Vec<_> = descriptor
            .warnings
            .iter()
            .filter(|w| matches!(w, Warning::MaterialLoad { .. }))
            .collect();
        assert_eq!(missing.len(), 1);
        assert!(
            matches!(missing[0], Warning::MaterialLoad { path, .. } if path == "/vehicle/truck/paint_b.mat")
        );
    }

    #[test]
    fn test_non_utf8_material_path() {
        let builder = DescriptorBuilder {
            looks: vec![("default", vec!["pXint.mat"])],
            ..DescriptorBuilder::single_part()
        };
        let mut data = builder.build();
        let at = data.windows(5).position(|w| w == b"pXint").unwrap();
        data[at + 1] = 0xE9;

        let descriptor = decode_with(&data, &source()).unwrap();

        let material = &descriptor.looks[0].materials[0];
        assert_eq!(material.path(), "/vehicle/truck/p\u{FFFD}int.mat");
        assert_eq!(material.effect(), "");
        assert_eq!(&*descriptor.aliases[0], "mat_0000");
        assert!(matches!(
            descriptor.warnings.as_slice(),
            [Warning::MaterialLoad { path, .. }] if path == "/vehicle/truck/p\u{FFFD}int.mat"
        ));
    }

    #[test]
    fn test_variant_values() {
        let descriptor = decode_with(&two_looks().build(), &source()).unwrap();
        assert_eq!(descriptor.variants.len(), 2);

        let damaged = &descriptor.variants[1];
        assert_eq!(damaged.name, "damaged");
        assert_eq!(damaged.parts.len(), 2);
        assert_eq!(damaged.parts[0].part, 0);
        assert_eq!(
            damaged.parts[0].get("visible").map(|a| a.value),
            Some(AttributeValue::Int(0))
        );
        assert_eq!(
            damaged.parts[0].get("dirt").map(|a| a.value),
            Some(AttributeValue::Int(7))
        );
        assert_eq!(
            descriptor.variants[0].parts[0].get("dirt").map(|a| a.value),
            Some(AttributeValue::Int(5))
        );
    }

    #[test]
    fn test_unknown_attribute_type_skipped() {
        let descriptor = decode_with(&two_looks().build(), &source()).unwrap();

        for variant in &descriptor.variants {
            assert!(variant.parts[1].attributes.is_empty());
        }
        let unknown: Vec<_> = descriptor
            .warnings
            .iter()
            .filter(|w| matches!(w, Warning::UnknownAttributeType { .. }))
            .collect();
        assert_eq!(unknown.len(), 2);
        assert_eq!(
            unknown[1],
            &Warning::UnknownAttributeType {
                variant: "damaged".into(),
                part: 1,
                attribute: "odd".into(),
                type_code: 3,
            }
        );
    }

    #[test]
    fn test_unsupported_version() {
        let builder = DescriptorBuilder {
            version: Some(3),
            ..DescriptorBuilder::single_part()
        };
        match decode_with(&builder.build(), &source()).unwrap_err() {
            Error::UnsupportedVersion {
                container,
                expected,
                actual,
            } => {
                assert_eq!(container, Container::Descriptor);
                assert_eq!(expected, "4");
                assert_eq!(actual, "3");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_attribute_index_out_of_range() {
        let builder = DescriptorBuilder {
            links: vec![(0, 2)],
            ..DescriptorBuilder::single_part()
        };
        assert!(matches!(
            decode_with(&builder.build(), &source()).unwrap_err(),
            Error::CorruptDescriptor { offset: 1, .. }
        ));
    }

    #[test]
    fn test_value_outside_buffer() {
        let builder = DescriptorBuilder {
            definitions: vec![("visible", AttribDef::KIND_INT, 4096)],
            ..DescriptorBuilder::single_part()
        };
        assert!(matches!(
            decode_with(&builder.build(), &source()).unwrap_err(),
            Error::CorruptDescriptor { .. }
        ));
    }

    #[test]
    fn test_truncated_material_table() {
        let mut data = DescriptorBuilder::single_part().build();
        // point the material table past the end
        let header_offset = 14 * 4;
        data[header_offset..header_offset + 4].copy_from_slice(&u32::MAX.to_le_bytes());

        assert!(matches!(
            decode_with(&data, &source()).unwrap_err(),
            Error::CorruptDescriptor { .. }
        ));
    }

    #[test]
    fn test_truncated_header() {
        assert!(matches!(
            decode_with(&[4, 0, 0, 0], &source()).unwrap_err(),
            Error::CorruptDescriptor { offset: 0, .. }
        ));
    }
}
