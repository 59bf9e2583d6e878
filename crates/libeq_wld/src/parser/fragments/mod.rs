//! Fragment decoders.
//!
//! Every WLD fragment record shares the same header (size, type, name
//! reference); what follows is type-specific and is decoded here, type by
//! type, against a [`Cursor`] over the record's body. A type this module
//! doesn't recognize decodes as [`FragmentType::Unknown`] instead of
//! aborting the document.

mod actor_definition;
mod actor_placement;
pub mod common;
mod bsp_region_vis;
mod material_fragment;
mod material_palette_fragment;
mod mesh;
mod mesh_ref;
mod region_properties;
mod skeleton_def;
mod skeleton_ref;
mod skeleton_track;
mod skeleton_track_ref;
mod spell_bolt_def;
mod spell_bolt_ref;
mod texture_file;
mod texture_file_list;
mod texture_file_list_ref;
mod vertex_colors;
mod vertex_colors_ref;
mod weapon_particles;
mod world_bsp_tree;
mod zone_param;

pub use actor_definition::{ActorAction, ActorDef, ActorLevelOfDetail};
pub use actor_placement::ActorPlacement;
pub use bsp_region_vis::BspRegionVis;
pub use common::{EncodedFilename, Location};
pub use material_fragment::Material;
pub use material_palette_fragment::MaterialPalette;
pub use mesh::{Mesh, MeshFace, MeshOp};
pub use mesh_ref::MeshRef;
pub use region_properties::RegionProperties;
pub use skeleton_def::{SkeletonDef, SkeletonDefEntry};
pub use skeleton_ref::SkeletonRef;
pub use skeleton_track::{SkeletonTrack, TrackFrame};
pub use skeleton_track_ref::SkeletonTrackRef;
pub use spell_bolt_def::SpellBoltDef;
pub use spell_bolt_ref::SpellBoltRef;
pub use texture_file::TextureFile;
pub use texture_file_list::TextureFileList;
pub use texture_file_list_ref::TextureFileListRef;
pub use vertex_colors::VertexColors;
pub use vertex_colors_ref::VertexColorsRef;
pub use weapon_particles::{ParticleMovement, WeaponParticles};
pub use world_bsp_tree::{BspTree, BspTreeNode};
pub use zone_param::ZoneParam;

use std::any::Any;
use std::marker::PhantomData;

use crate::cursor::{Cursor, UnexpectedEof};

use super::StringReference;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A signed, 1-based reference into the document's own fragment list.
/// `0` (or negative) means absent; the type parameter pins what
/// [`crate::WldDoc::get`] is allowed to hand back.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FragmentRef<T> {
    pub reference: i32,
    #[cfg_attr(feature = "serde", serde(skip))]
    marker: PhantomData<fn() -> T>,
}

impl<T> FragmentRef<T> {
    pub fn new(reference: i32) -> Self {
        FragmentRef {
            reference,
            marker: PhantomData,
        }
    }

    pub fn parse(cursor: &mut Cursor) -> Result<Self, UnexpectedEof> {
        Ok(Self::new(cursor.i32_le()?))
    }

    pub fn is_absent(&self) -> bool {
        self.reference <= 0
    }
}

/// Implemented by every decoded fragment type so [`crate::WldDoc`] can hand
/// back a typed reference without a downcast machinery of its own.
pub trait Fragment: Any {
    fn downcast_ref(fragment: &FragmentType) -> Option<&Self>
    where
        Self: Sized;
}

macro_rules! fragment_types {
    ($($variant:ident($ty:ty) = $id:expr),+ $(,)?) => {
        /// Every fragment record in a document, decoded to its concrete
        /// type or left opaque as [`FragmentType::Unknown`].
        #[derive(Debug)]
        pub enum FragmentType {
            $($variant($ty),)+
            /// A fragment type this crate doesn't (yet, or ever) model.
            /// Decoding the document does not fail because of it.
            Unknown(u32, Vec<u8>),
        }

        impl FragmentType {
            pub fn type_id(&self) -> u32 {
                match self {
                    $(FragmentType::$variant(_) => $id,)+
                    FragmentType::Unknown(type_id, _) => *type_id,
                }
            }

            pub fn name_ref(&self) -> i32 {
                match self {
                    $(FragmentType::$variant(f) => f.name_reference.0,)+
                    FragmentType::Unknown(..) => 0,
                }
            }
        }

        $(
            impl Fragment for $ty {
                fn downcast_ref(fragment: &FragmentType) -> Option<&Self> {
                    match fragment {
                        FragmentType::$variant(f) => Some(f),
                        _ => None,
                    }
                }
            }
        )+

        pub(super) fn decode(
            fragment_type: u32,
            name_reference: i32,
            data: &[u8],
        ) -> Result<FragmentType, UnexpectedEof> {
            let name_reference = StringReference::new(name_reference);
            let mut cursor = Cursor::new(data);
            match fragment_type {
                $($id => Ok(FragmentType::$variant(<$ty>::parse(name_reference, &mut cursor)?)),)+
                other => Ok(FragmentType::Unknown(other, data.to_vec())),
            }
        }
    };
}

fragment_types! {
    TextureFile(TextureFile) = 0x03,
    TextureFileList(TextureFileList) = 0x04,
    TextureFileListRef(TextureFileListRef) = 0x05,
    SkeletonDef(SkeletonDef) = 0x10,
    SkeletonRef(SkeletonRef) = 0x11,
    SkeletonTrack(SkeletonTrack) = 0x12,
    SkeletonTrackRef(SkeletonTrackRef) = 0x13,
    ActorDef(ActorDef) = 0x14,
    ActorPlacement(ActorPlacement) = 0x15,
    ZoneParam(ZoneParam) = 0x16,
    BspTree(BspTree) = 0x21,
    BspRegionVis(BspRegionVis) = 0x22,
    SpellBoltDef(SpellBoltDef) = 0x26,
    SpellBoltRef(SpellBoltRef) = 0x27,
    RegionProperties(RegionProperties) = 0x29,
    MeshRef(MeshRef) = 0x2d,
    Material(Material) = 0x30,
    MaterialPalette(MaterialPalette) = 0x31,
    VertexColors(VertexColors) = 0x32,
    VertexColorsRef(VertexColorsRef) = 0x33,
    WeaponParticles(WeaponParticles) = 0x34,
    Mesh(Mesh) = 0x36,
}
