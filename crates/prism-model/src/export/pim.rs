//! Geometry container (`.pim`).

use std::io::{self, Write};

use super::{render_with, write_header, Hex, HexList, EOL};
use crate::mesh::{Piece, Vertex};
use crate::Model;

const FORMAT_VERSION: u32 = 5;

/// Writes the geometry container of a model.
pub struct PimWriter<'a> {
    model: &'a Model,
}

impl<'a> PimWriter<'a> {
    pub fn new(model: &'a Model) -> Self {
        Self { model }
    }

    /// Render the container into a string.
    pub fn render(&self) -> String {
        render_with(|out| self.write(out))
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let model = self.model;
        write_header(writer, FORMAT_VERSION, "Model", model.file_name())?;
        self.write_global(writer)?;

        if let Some(look) = model.looks().first() {
            for material in &look.materials {
                material.write_declaration(writer)?;
            }
        }
        for piece in model.pieces() {
            write_piece(writer, piece)?;
        }
        self.write_parts(writer)?;
        self.write_locators(writer)?;
        self.write_bones(writer)?;
        if model.skin_vertex_count() > 0 {
            self.write_skin(writer)?;
        }
        Ok(())
    }

    fn write_global<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let model = self.model;
        write!(writer, "Global {{{EOL}")?;
        write!(writer, "\tVertexCount: {}{EOL}", model.vertex_count())?;
        write!(writer, "\tTriangleCount: {}{EOL}", model.triangle_count())?;
        write!(writer, "\tMaterialCount: {}{EOL}", model.material_count())?;
        write!(writer, "\tPieceCount: {}{EOL}", model.pieces().len())?;
        write!(writer, "\tPartCount: {}{EOL}", model.parts().len())?;
        write!(writer, "\tBoneCount: {}{EOL}", model.bones().len())?;
        write!(writer, "\tLocatorCount: {}{EOL}", model.locators().len())?;
        write!(writer, "\tSkeleton: \"{}.pis\"{EOL}", model.file_name())?;
        write!(writer, "}}{EOL}")
    }

    fn write_parts<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for part in self.model.parts() {
            write!(writer, "Part {{{EOL}")?;
            write!(writer, "\tName: \"{}\"{EOL}", part.name)?;
            write!(writer, "\tPieceCount: {}{EOL}", part.piece_count)?;
            write!(writer, "\tLocatorCount: {}{EOL}", part.locator_count)?;
            write!(writer, "\tPieces: ")?;
            for index in part.pieces() {
                write!(writer, "{index} ")?;
            }
            write!(writer, "{EOL}\tLocators: ")?;
            for index in part.locators() {
                write!(writer, "{index} ")?;
            }
            write!(writer, "{EOL}}}{EOL}")?;
        }
        Ok(())
    }

    fn write_locators<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for locator in self.model.locators() {
            write!(writer, "Locator {{{EOL}")?;
            write!(writer, "\tName: \"{}\"{EOL}", locator.name)?;
            if !locator.hookup.is_empty() {
                write!(writer, "\tHookup: \"{}\"{EOL}", locator.hookup_name())?;
            }
            write!(writer, "\tIndex: {}{EOL}", locator.index)?;
            write!(writer, "\tPosition: ( {} ){EOL}", HexList(&locator.position))?;
            write!(writer, "\tRotation: ( {} ){EOL}", HexList(&locator.rotation))?;
            write!(writer, "\tScale: ( {} ){EOL}", Hex(locator.scale))?;
            write!(writer, "}}{EOL}")?;
        }
        Ok(())
    }

    fn write_bones<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let bones = self.model.bones();
        if bones.is_empty() {
            return Ok(());
        }
        write!(writer, "Bones {{{EOL}")?;
        for bone in bones {
            write!(writer, "\t{:<5}( \"{}\" ){EOL}", bone.index, bone.name)?;
        }
        write!(writer, "}}{EOL}")
    }

    /// One skin item per vertex of every skinned piece, each a clone of itself.
    fn write_skin<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let skinned = || {
            self.model
                .pieces()
                .iter()
                .filter(|piece| piece.is_skinned())
        };
        let item_count = self.model.skin_vertex_count();
        let weight_count: usize = skinned()
            .map(|piece| {
                let slots = piece.influence_slots();
                piece
                    .vertices()
                    .iter()
                    .map(|vertex| vertex.weighted_influences(slots).count())
                    .sum::<usize>()
            })
            .sum();

        write!(writer, "Skin {{{EOL}")?;
        write!(writer, "\tStreamCount: 1{EOL}")?;
        write!(writer, "\tSkinStream {{{EOL}")?;
        write!(writer, "\t\tFormat: FLOAT3{EOL}")?;
        write!(writer, "\t\tTag: \"_POSITION\"{EOL}")?;
        write!(writer, "\t\tItemCount: {item_count}{EOL}")?;
        write!(writer, "\t\tTotalWeightCount: {weight_count}{EOL}")?;
        write!(writer, "\t\tTotalCloneCount: {item_count}{EOL}")?;

        let mut item = 0;
        for piece in skinned() {
            let slots = piece.influence_slots();
            for (index, vertex) in piece.vertices().iter().enumerate() {
                write!(writer, "\t\t{item:<6}( ( {} ){EOL}", HexList(&vertex.position))?;
                write!(
                    writer,
                    "\t\t\t\tWeights: {:<6} ",
                    vertex.weighted_influences(slots).count()
                )?;
                for (bone, weight) in vertex.weighted_influences(slots) {
                    write!(writer, "{bone:<4} {} ", Hex(f32::from(weight) / 255.0))?;
                }
                write!(writer, "{EOL}")?;
                write!(writer, "\t\t\t\tClones: {:<6} {:<4} {index:<6}{EOL}", 1, piece.index)?;
                write!(writer, "\t\t      ){EOL}")?;
                item += 1;
            }
        }

        write!(writer, "\t}}{EOL}")?;
        write!(writer, "}}{EOL}")
    }
}

fn write_piece<W: Write>(writer: &mut W, piece: &Piece) -> io::Result<()> {
    let vertices = piece.vertices();
    write!(writer, "Piece {{{EOL}")?;
    write!(writer, "\tIndex: {}{EOL}", piece.index)?;
    write!(writer, "\tMaterial: {}{EOL}", piece.material)?;
    write!(writer, "\tVertexCount: {}{EOL}", vertices.len())?;
    write!(writer, "\tTriangleCount: {}{EOL}", piece.triangles().len())?;
    write!(writer, "\tStreamCount: {}{EOL}", piece.stream_count)?;

    let streams = piece.streams;
    if streams.position {
        write_stream(writer, "FLOAT3", "_POSITION", vertices, |v| &v.position[..])?;
    }
    if streams.normal {
        write_stream(writer, "FLOAT3", "_NORMAL", vertices, |v| &v.normal[..])?;
    }
    if streams.tangent {
        write_stream(writer, "FLOAT4", "_TANGENT", vertices, |v| &v.tangent[..])?;
    }
    if streams.texcoord {
        for channel in 0..piece.texcoord_count {
            let aliases = piece.texcoord_aliases(channel);
            write!(writer, "\tStream {{{EOL}")?;
            write!(writer, "\t\tFormat: FLOAT2{EOL}")?;
            write!(writer, "\t\tTag: \"_UV{channel}\"{EOL}")?;
            write!(writer, "\t\tAliasCount: {}{EOL}", aliases.len())?;
            write!(writer, "\t\tAliases: ")?;
            for alias in aliases {
                write!(writer, "\"_TEXCOORD{alias}\" ")?;
            }
            write!(writer, "{EOL}")?;
            write_stream_values(writer, vertices, |v| &v.texcoords[channel as usize][..])?;
            write!(writer, "\t}}{EOL}")?;
        }
    }
    if streams.color {
        write_stream(writer, "FLOAT4", "_RGBA", vertices, |v| &v.color[..])?;
    }
    if streams.color2 {
        write_stream(writer, "FLOAT4", "_RGBA1", vertices, |v| &v.color2[..])?;
    }

    write!(writer, "\tTriangles {{{EOL}")?;
    for (i, triangle) in piece.triangles().iter().enumerate() {
        let [a, b, c] = triangle.indices;
        write!(writer, "\t\t{i:<5}( {a:<5} {b:<5} {c:<5} ){EOL}")?;
    }
    write!(writer, "\t}}{EOL}")?;
    write!(writer, "}}{EOL}")
}

fn write_stream<W, F>(
    writer: &mut W,
    format: &str,
    tag: &str,
    vertices: &[Vertex],
    field: F,
) -> io::Result<()>
where
    W: Write,
    F: Fn(&Vertex) -> &[f32],
{
    write!(writer, "\tStream {{{EOL}")?;
    write!(writer, "\t\tFormat: {format}{EOL}")?;
    write!(writer, "\t\tTag: \"{tag}\"{EOL}")?;
    write_stream_values(writer, vertices, field)?;
    write!(writer, "\t}}{EOL}")
}

fn write_stream_values<W, F>(writer: &mut W, vertices: &[Vertex], field: F) -> io::Result<()>
where
    W: Write,
    F: Fn(&Vertex) -> &[f32],
{
    for (i, vertex) in vertices.iter().enumerate() {
        write!(writer, "\t\t{i:<5}( {} ){EOL}", HexList(field(vertex)))?;
    }
    Ok(())
}
