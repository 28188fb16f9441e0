//! Recordable mesh-building commands.
//!
//! [`MeshBuilder`] is the front-end surface of the builder. [`EasyMesh`]
//! executes commands as they arrive, [`CommandRecorder`] stores them so a
//! build can be serialized and replayed later.
//!
//! ```
//! use easymesh::{CommandRecorder, EasyMesh, MeshBuilder};
//! use nalgebra::Vector3;
//!
//! let mut recorder = CommandRecorder::new();
//! recorder.open_brace()?;
//! recorder.append_box(Vector3::new(1.0, 1.0, 1.0))?;
//! recorder.close_brace()?;
//!
//! let json = recorder.to_json()?;
//! let mut mesh = EasyMesh::new();
//! CommandRecorder::from_json(&json)?.replay(&mut mesh)?;
//! assert_eq!(mesh.triangle_count(), 12);
//! # Ok::<(), easymesh::CsgError>(())
//! ```

use nalgebra::{Vector3, Vector4};
use serde::{Deserialize, Serialize};

use crate::{Axis, CsgOperation, CsgResult, EasyMesh};

/// One builder operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum MeshCommand {
    OpenBrace,
    CloseBrace,
    SetColor { color: [f32; 4] },
    SetColorA { color: [f32; 4] },
    SetColorB { color: [f32; 4] },
    SetVertexColor { color: [f32; 4] },
    ToggleScaleWinding,
    ToggleVertexCleanup,
    Translate { offset: [f32; 3] },
    /// Rotation in degrees around an arbitrary axis.
    Rotate { angle: f32, axis: [f32; 3] },
    Scale { factors: [f32; 3] },
    /// Taper along `axis`; `first` and `second` apply to the two other axes
    /// in x, y, z order.
    Taper {
        axis: Axis,
        first: f32,
        second: f32,
        offset: f32,
    },
    Mirror { axis: Axis },
    /// Random push along origin-to-vertex rays, reproducible from `seed`.
    RadialJitter {
        max: f32,
        #[serde(default)]
        seed: u64,
    },
    DupAndScale { factors: [f32; 3] },
    AppendBox { size: [f32; 3] },
    AppendSimpleTriangle {
        size: f32,
        #[serde(default)]
        fade: bool,
    },
    AppendSimpleQuad {
        size: f32,
        #[serde(default)]
        fade: bool,
    },
    Csg { operation: CsgOperation },
    VerticesCleanup,
}

/// Receiver of builder commands.
///
/// Implementors only provide [`execute`](Self::execute); the named methods
/// wrap their arguments into a [`MeshCommand`].
pub trait MeshBuilder {
    /// Runs or stores `command`.
    ///
    /// # Errors
    ///
    /// Executors report failed CSG operations.
    fn execute(&mut self, command: MeshCommand) -> CsgResult<()>;

    fn open_brace(&mut self) -> CsgResult<()> {
        self.execute(MeshCommand::OpenBrace)
    }

    fn close_brace(&mut self) -> CsgResult<()> {
        self.execute(MeshCommand::CloseBrace)
    }

    fn set_color(&mut self, color: Vector4<f32>) -> CsgResult<()> {
        self.execute(MeshCommand::SetColor { color: color.into() })
    }

    fn set_color_a(&mut self, color: Vector4<f32>) -> CsgResult<()> {
        self.execute(MeshCommand::SetColorA { color: color.into() })
    }

    fn set_color_b(&mut self, color: Vector4<f32>) -> CsgResult<()> {
        self.execute(MeshCommand::SetColorB { color: color.into() })
    }

    fn set_vertex_color(&mut self, color: Vector4<f32>) -> CsgResult<()> {
        self.execute(MeshCommand::SetVertexColor { color: color.into() })
    }

    fn toggle_scale_winding(&mut self) -> CsgResult<()> {
        self.execute(MeshCommand::ToggleScaleWinding)
    }

    fn toggle_vertex_cleanup(&mut self) -> CsgResult<()> {
        self.execute(MeshCommand::ToggleVertexCleanup)
    }

    fn translate(&mut self, offset: Vector3<f32>) -> CsgResult<()> {
        self.execute(MeshCommand::Translate { offset: offset.into() })
    }

    fn rotate(&mut self, angle: f32, axis: Vector3<f32>) -> CsgResult<()> {
        self.execute(MeshCommand::Rotate {
            angle,
            axis: axis.into(),
        })
    }

    fn rotate_x(&mut self, angle: f32) -> CsgResult<()> {
        MeshBuilder::rotate(self, angle, Axis::X.unit())
    }

    fn rotate_y(&mut self, angle: f32) -> CsgResult<()> {
        MeshBuilder::rotate(self, angle, Axis::Y.unit())
    }

    fn rotate_z(&mut self, angle: f32) -> CsgResult<()> {
        MeshBuilder::rotate(self, angle, Axis::Z.unit())
    }

    fn scale(&mut self, factors: Vector3<f32>) -> CsgResult<()> {
        self.execute(MeshCommand::Scale {
            factors: factors.into(),
        })
    }

    fn taper(&mut self, axis: Axis, first: f32, second: f32, offset: f32) -> CsgResult<()> {
        self.execute(MeshCommand::Taper {
            axis,
            first,
            second,
            offset,
        })
    }

    fn mirror(&mut self, axis: Axis) -> CsgResult<()> {
        self.execute(MeshCommand::Mirror { axis })
    }

    fn radial_jitter(&mut self, max: f32, seed: u64) -> CsgResult<()> {
        self.execute(MeshCommand::RadialJitter { max, seed })
    }

    fn dup_and_scale(&mut self, factors: Vector3<f32>) -> CsgResult<()> {
        self.execute(MeshCommand::DupAndScale {
            factors: factors.into(),
        })
    }

    fn append_box(&mut self, size: Vector3<f32>) -> CsgResult<()> {
        self.execute(MeshCommand::AppendBox { size: size.into() })
    }

    fn append_simple_triangle(&mut self, size: f32, fade: bool) -> CsgResult<()> {
        self.execute(MeshCommand::AppendSimpleTriangle { size, fade })
    }

    fn append_simple_quad(&mut self, size: f32, fade: bool) -> CsgResult<()> {
        self.execute(MeshCommand::AppendSimpleQuad { size, fade })
    }

    fn csg(&mut self, operation: CsgOperation) -> CsgResult<()> {
        self.execute(MeshCommand::Csg { operation })
    }

    fn vertices_cleanup(&mut self) -> CsgResult<()> {
        self.execute(MeshCommand::VerticesCleanup)
    }
}

impl MeshBuilder for EasyMesh {
    fn execute(&mut self, command: MeshCommand) -> CsgResult<()> {
        match command {
            MeshCommand::OpenBrace => EasyMesh::open_brace(self),
            MeshCommand::CloseBrace => EasyMesh::close_brace(self),
            MeshCommand::SetColor { color } => EasyMesh::set_color(self, color.into()),
            MeshCommand::SetColorA { color } => EasyMesh::set_color_a(self, color.into()),
            MeshCommand::SetColorB { color } => EasyMesh::set_color_b(self, color.into()),
            MeshCommand::SetVertexColor { color } => EasyMesh::set_vertex_color(self, color.into()),
            MeshCommand::ToggleScaleWinding => EasyMesh::toggle_scale_winding(self),
            MeshCommand::ToggleVertexCleanup => EasyMesh::toggle_vertex_cleanup(self),
            MeshCommand::Translate { offset } => EasyMesh::translate(self, offset.into()),
            MeshCommand::Rotate { angle, axis } => EasyMesh::rotate(self, angle, axis.into()),
            MeshCommand::Scale { factors } => EasyMesh::scale(self, factors.into()),
            MeshCommand::Taper {
                axis,
                first,
                second,
                offset,
            } => match axis {
                Axis::X => self.taper_x(first, second, offset),
                Axis::Y => self.taper_y(first, second, offset),
                Axis::Z => self.taper_z(first, second, offset),
            },
            MeshCommand::Mirror { axis } => match axis {
                Axis::X => self.mirror_x(),
                Axis::Y => self.mirror_y(),
                Axis::Z => self.mirror_z(),
            },
            MeshCommand::RadialJitter { max, seed } => EasyMesh::radial_jitter(self, max, seed),
            MeshCommand::DupAndScale { factors } => EasyMesh::dup_and_scale(self, factors.into()),
            MeshCommand::AppendBox { size } => EasyMesh::append_box(self, size.into()),
            MeshCommand::AppendSimpleTriangle { size, fade } => {
                EasyMesh::append_simple_triangle(self, size, fade)
            }
            MeshCommand::AppendSimpleQuad { size, fade } => {
                EasyMesh::append_simple_quad(self, size, fade)
            }
            MeshCommand::Csg { operation } => return self.mesh_csg(operation),
            MeshCommand::VerticesCleanup => EasyMesh::vertices_cleanup(self),
        }
        Ok(())
    }
}

/// Stores commands for later replay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandRecorder {
    commands: Vec<MeshCommand>,
}

impl CommandRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn commands(&self) -> &[MeshCommand] {
        &self.commands
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Sends every recorded command to `target`, in order.
    ///
    /// # Errors
    ///
    /// Stops at the first command `target` fails to execute.
    pub fn replay<B: MeshBuilder + ?Sized>(&self, target: &mut B) -> CsgResult<()> {
        for command in &self.commands {
            target.execute(command.clone())?;
        }
        Ok(())
    }

    /// Encodes the recording as a JSON array.
    pub fn to_json(&self) -> CsgResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> CsgResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl MeshBuilder for CommandRecorder {
    fn execute(&mut self, command: MeshCommand) -> CsgResult<()> {
        self.commands.push(command);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CsgError;

    #[test]
    fn recorder_stores_commands() {
        let mut recorder = CommandRecorder::new();
        MeshBuilder::rotate_y(&mut recorder, 90.0).unwrap();
        MeshBuilder::csg(&mut recorder, CsgOperation::Xor).unwrap();

        assert_eq!(
            recorder.commands(),
            &[
                MeshCommand::Rotate {
                    angle: 90.0,
                    axis: [0.0, 1.0, 0.0]
                },
                MeshCommand::Csg {
                    operation: CsgOperation::Xor
                },
            ]
        );
    }

    #[test]
    fn json_layout() {
        let mut recorder = CommandRecorder::new();
        MeshBuilder::mirror(&mut recorder, Axis::Z).unwrap();
        MeshBuilder::append_simple_quad(&mut recorder, 2.0, false).unwrap();

        let json = recorder.to_json().unwrap();
        assert_eq!(
            json,
            r#"[{"op":"mirror","axis":"z"},{"op":"append_simple_quad","size":2.0,"fade":false}]"#
        );
        assert_eq!(CommandRecorder::from_json(&json).unwrap(), recorder);
    }

    #[test]
    fn fade_defaults_off() {
        let recorder =
            CommandRecorder::from_json(r#"[{"op":"append_simple_triangle","size":1.5}]"#).unwrap();
        assert_eq!(
            recorder.commands(),
            &[MeshCommand::AppendSimpleTriangle {
                size: 1.5,
                fade: false
            }]
        );
    }

    #[test]
    fn jitter_seed_defaults_to_zero() {
        let recorder = CommandRecorder::from_json(r#"[{"op":"radial_jitter","max":0.25}]"#).unwrap();
        assert_eq!(
            recorder.commands(),
            &[MeshCommand::RadialJitter { max: 0.25, seed: 0 }]
        );
    }

    #[test]
    fn malformed_json_is_a_command_error() {
        let err = CommandRecorder::from_json(r#"[{"op":"explode"}]"#).unwrap_err();
        assert!(matches!(err, CsgError::Command(_)));
    }

    #[test]
    fn replay_matches_direct_calls() {
        let mut recorder = CommandRecorder::new();
        let mut direct = EasyMesh::new();
        for builder in [&mut recorder as &mut dyn MeshBuilder, &mut direct] {
            builder.open_brace().unwrap();
            builder.append_box(Vector3::new(2.0, 2.0, 2.0)).unwrap();
            builder.radial_jitter(0.2, 11).unwrap();
            builder.open_brace().unwrap();
            builder.append_box(Vector3::new(1.0, 1.0, 1.0)).unwrap();
            builder.translate(Vector3::new(1.0, 0.5, 0.0)).unwrap();
            builder.taper(Axis::Y, 0.1, 0.1, 0.0).unwrap();
            builder.csg(CsgOperation::Union).unwrap();
            builder.close_brace().unwrap();
            builder.close_brace().unwrap();
        }

        let mut replayed = EasyMesh::new();
        recorder.replay(&mut replayed).unwrap();
        assert_eq!(replayed.indices(), direct.indices());
        assert_eq!(replayed.vertices(), direct.vertices());
    }
}
