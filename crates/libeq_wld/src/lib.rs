///! # An Everquest .wld file loader
///! Loads the scene-graph fragments out of a `.wld` document — meshes,
///! materials, actor definitions and placements, skeletons, and the BSP
///! tree that partitions a zone into regions.
///!
///! # Acknowledgements
///! This project wouldn't have been possible without Windcatcher's [WLD File Reference](https://eqemu.gitbook.io/server/categories/zones/customizing-zones/wld-file-reference).
pub mod animation;
pub mod cursor;
pub mod parser;

use parser::{
    ActorDef, ActorPlacement, BspRegionVis, BspTree, Material, Mesh, MeshRef, RegionProperties,
    SkeletonDef, WldDoc, WldError,
};

/// A loaded `.wld` document.
pub struct Wld(WldDoc);

/// Load and parse a wld file from a slice.
pub fn load(data: &[u8]) -> Result<Wld, WldError> {
    Ok(Wld(WldDoc::parse(data)?))
}

impl Wld {
    pub fn doc(&self) -> &WldDoc {
        &self.0
    }

    /// Iterate over all meshes in the wld file.
    pub fn meshes(&self) -> impl Iterator<Item = MeshView> + '_ {
        self.0.fragment_iter::<Mesh>().map(move |fragment| MeshView {
            doc: &self.0,
            fragment,
        })
    }

    /// Iterate over all materials in the wld file.
    pub fn materials(&self) -> impl Iterator<Item = MaterialView> + '_ {
        self.0
            .fragment_iter::<Material>()
            .map(move |fragment| MaterialView {
                doc: &self.0,
                fragment,
            })
    }

    /// Iterate over every actor definition (a skeleton/mesh set and its
    /// animation actions).
    pub fn actor_defs(&self) -> impl Iterator<Item = ActorDefView> + '_ {
        self.0
            .fragment_iter::<ActorDef>()
            .map(move |fragment| ActorDefView {
                doc: &self.0,
                fragment,
            })
    }

    /// Iterate over every placed instance of an actor in the zone.
    pub fn actor_placements(&self) -> impl Iterator<Item = ActorPlacementView> + '_ {
        self.0
            .fragment_iter::<ActorPlacement>()
            .map(move |fragment| ActorPlacementView {
                doc: &self.0,
                fragment,
            })
    }

    /// Iterate over every skeleton definition.
    pub fn skeletons(&self) -> impl Iterator<Item = &SkeletonDef> + '_ {
        self.0.fragment_iter::<SkeletonDef>()
    }

    /// Iterate over every BSP region's visibility and geometry binding.
    pub fn regions(&self) -> impl Iterator<Item = &BspRegionVis> + '_ {
        self.0.fragment_iter::<BspRegionVis>()
    }

    /// Iterate over every region's gameplay property tags.
    pub fn region_properties(&self) -> impl Iterator<Item = &RegionProperties> + '_ {
        self.0.fragment_iter::<RegionProperties>()
    }

    /// The zone's BSP tree, if one is present.
    pub fn bsp_tree(&self) -> Option<&BspTree> {
        self.0.fragment_iter::<BspTree>().next()
    }

    /// Every skeleton recognized by its `*_HS_DEF` name, paired with the
    /// pose plus every other animation found for it elsewhere in the
    /// document.
    pub fn skeleton_animations(&self) -> Vec<(String, &SkeletonDef, animation::AnimationSet)> {
        self.0
            .fragment_iter::<SkeletonDef>()
            .filter_map(|def| {
                let name = self.0.get_string(def.name_reference)?;
                if !animation::is_skeleton_def_name(&name) {
                    return None;
                }
                let key = name[0..3].to_string();
                let set = animation::AnimationSet::build(&self.0, &key, def);
                Some((key, def, set))
            })
            .collect()
    }

    /// Sample one skeleton's animation (a per-bone track array from
    /// [`skeleton_animations`](Self::skeleton_animations)) at `frame`.
    pub fn transformations(
        &self,
        skeleton: &SkeletonDef,
        animation_tracks: &[parser::FragmentRef<parser::SkeletonTrackRef>],
        frame: usize,
    ) -> std::collections::BTreeMap<usize, animation::BoneTransform> {
        animation::transformations(&self.0, skeleton, animation_tracks, frame)
    }
}

pub struct MeshView<'a> {
    doc: &'a WldDoc,
    fragment: &'a Mesh,
}

impl<'a> MeshView<'a> {
    pub fn name(&self) -> Option<String> {
        self.doc.get_string(self.fragment.name_reference)
    }

    pub fn center(&self) -> (f32, f32, f32) {
        self.fragment.center
    }

    /// Vertex positions in world units: `2^-scale`, then the mesh center
    /// added (the asset-rendering code path does this; the other lineage
    /// in the prior art leaves vertices mesh-local — see DESIGN.md).
    pub fn positions(&self) -> Vec<[f32; 3]> {
        let scale = self.fragment.position_scale();
        let (cx, cy, cz) = self.fragment.center;
        self.fragment
            .positions
            .iter()
            .map(|v| [v.0 as f32 * scale + cx, v.1 as f32 * scale + cy, v.2 as f32 * scale + cz])
            .collect()
    }

    /// Unit vertex normals.
    pub fn normals(&self) -> Vec<[f32; 3]> {
        self.fragment
            .vertex_normals
            .iter()
            .map(|v| [v.0 as f32 / 127.0, v.1 as f32 / 127.0, v.2 as f32 / 127.0])
            .collect()
    }

    pub fn texture_coordinates(&self) -> Vec<[f32; 2]> {
        self.fragment
            .texture_coordinates
            .iter()
            .map(|v| [v.0 as f32 / 256.0, v.1 as f32 / 256.0])
            .collect()
    }

    /// Triangle-list indices into `positions`.
    pub fn indices(&self) -> Vec<u32> {
        self.fragment
            .faces
            .iter()
            .flat_map(|f| {
                [
                    f.vertex_indexes.0 as u32,
                    f.vertex_indexes.1 as u32,
                    f.vertex_indexes.2 as u32,
                ]
            })
            .collect()
    }

    /// Indices of faces that participate in collision (the "invisible to
    /// collision" flag bit is unset).
    pub fn collision_indices(&self) -> Vec<u32> {
        self.fragment
            .faces
            .iter()
            .filter(|f| f.flags & 0x0010 == 0)
            .flat_map(|f| {
                [
                    f.vertex_indexes.0 as u32,
                    f.vertex_indexes.1 as u32,
                    f.vertex_indexes.2 as u32,
                ]
            })
            .collect()
    }

    pub fn materials(&self) -> Vec<MaterialView<'a>> {
        let Some(palette) = self.doc.get(&self.fragment.material_palette_reference) else {
            return Vec::new();
        };
        palette
            .material_references
            .iter()
            .filter_map(|reference| self.doc.get(reference))
            .map(|fragment| MaterialView {
                doc: self.doc,
                fragment,
            })
            .collect()
    }
}

pub struct MaterialView<'a> {
    doc: &'a WldDoc,
    fragment: &'a Material,
}

impl<'a> MaterialView<'a> {
    pub fn name(&self) -> Option<String> {
        self.doc.get_string(self.fragment.name_reference)
    }

    pub fn render_method(&self) -> u32 {
        self.fragment.render_method
    }

    pub fn is_masked(&self) -> bool {
        self.fragment.is_masked()
    }

    /// The filenames backing this material's base texture, in playback
    /// order for an animated texture.
    pub fn texture_file_names(&self) -> Vec<String> {
        let Some(texture_ref) = self.doc.get(&self.fragment.texture_reference) else {
            return Vec::new();
        };
        let Some(file_list) = self.doc.get(&texture_ref.reference) else {
            return Vec::new();
        };
        file_list
            .frame_references
            .iter()
            .filter_map(|r| self.doc.get(r))
            .flat_map(|file| file.file_names.iter().map(|f| f.file_name.to_lowercase()))
            .collect()
    }
}

pub struct ActorDefView<'a> {
    doc: &'a WldDoc,
    fragment: &'a ActorDef,
}

impl<'a> ActorDefView<'a> {
    pub fn name(&self) -> Option<String> {
        self.doc.get_string(self.fragment.name_reference)
    }

    pub fn skeleton(&self) -> Option<&'a SkeletonDef> {
        self.fragment.actions.iter().find_map(|action| {
            action.levels_of_detail.iter().find_map(|lod| {
                match self.doc.resolve(lod.sprite_reference) {
                    parser::Resolved::Fragment(f) => f.downcast_skeleton(),
                    _ => None,
                }
            })
        })
    }

    /// The first mesh attached to this actor, following a
    /// [`MeshRef`] indirection if the sprite slot points at one.
    pub fn mesh(&self) -> Option<MeshView<'a>> {
        self.fragment.actions.first().and_then(|action| {
            action.levels_of_detail.first().and_then(|lod| {
                let mesh_ref: parser::FragmentRef<MeshRef> =
                    parser::FragmentRef::new(lod.sprite_reference);
                let mesh_ref = self.doc.get(&mesh_ref)?;
                self.doc.get(&mesh_ref.reference).map(|fragment| MeshView {
                    doc: self.doc,
                    fragment,
                })
            })
        })
    }
}

pub struct ActorPlacementView<'a> {
    doc: &'a WldDoc,
    fragment: &'a ActorPlacement,
}

impl<'a> ActorPlacementView<'a> {
    pub fn actor_def_name(&self) -> Option<String> {
        let actor_def: &ActorDef = self.doc.get(&self.fragment.actor_def_reference)?;
        self.doc.get_string(actor_def.name_reference)
    }

    pub fn position(&self) -> (f32, f32, f32) {
        (
            self.fragment.location.x,
            self.fragment.location.y,
            self.fragment.location.z,
        )
    }

    /// Euler rotation in degrees, converted from the file's
    /// `degrees * (512 / 360)` units.
    pub fn rotation_degrees(&self) -> (f32, f32, f32) {
        let to_degrees = |v: f32| (v / 512.0) * 360.0;
        (
            to_degrees(self.fragment.location.rotate_x),
            to_degrees(self.fragment.location.rotate_y),
            to_degrees(self.fragment.location.rotate_z),
        )
    }

    pub fn scale(&self) -> (f32, f32) {
        (self.fragment.scale_x, self.fragment.scale_y)
    }
}

impl parser::FragmentType {
    fn downcast_skeleton(&self) -> Option<&SkeletonDef> {
        <SkeletonDef as parser::Fragment>::downcast_ref(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn masked(bytes: &[u8]) -> Vec<u8> {
        bytes
            .iter()
            .zip([0x95u8, 0x3a, 0xc5, 0x2a, 0x95, 0x7a, 0x95, 0x6a].iter().cycle())
            .map(|(b, k)| b ^ k)
            .collect()
    }

    fn doc_with_one_empty_mesh() -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&0x54503d02u32.to_le_bytes());
        data.extend_from_slice(&0x1000C800u32.to_le_bytes());
        data.extend_from_slice(&1u32.to_le_bytes()); // fragment_count
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        let name = masked(b"AMESH\0");
        data.extend_from_slice(&(name.len() as u32).to_le_bytes()); // string_hash_size
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&name);

        let mut body = Vec::new();
        body.extend_from_slice(&0u32.to_le_bytes()); // flags
        body.extend_from_slice(&0i32.to_le_bytes()); // material_palette_reference
        body.extend_from_slice(&0i32.to_le_bytes()); // animated_vertices_reference
        body.extend_from_slice(&0i32.to_le_bytes()); // unknown_reference_3
        body.extend_from_slice(&0i32.to_le_bytes()); // unknown_reference_4
        body.extend(std::iter::repeat(0u8).take(3 * 4)); // center
        body.extend(std::iter::repeat(0u8).take(3 * 4)); // params2
        body.extend_from_slice(&0f32.to_le_bytes()); // max_distance
        body.extend(std::iter::repeat(0u8).take(3 * 4)); // min
        body.extend(std::iter::repeat(0u8).take(3 * 4)); // max
        for _ in 0..10 {
            body.extend_from_slice(&0u16.to_le_bytes()); // nine array counts + scale
        }

        data.extend_from_slice(&((body.len() + 4) as u32).to_le_bytes()); // size
        data.extend_from_slice(&0x36u32.to_le_bytes()); // fragment_type: Mesh
        data.extend_from_slice(&(-1i32).to_le_bytes()); // name_reference
        data.extend_from_slice(&body);
        data
    }

    #[test]
    fn it_loads_and_iterates_meshes() {
        let wld = load(&doc_with_one_empty_mesh()).unwrap();
        let meshes: Vec<_> = wld.meshes().collect();
        assert_eq!(meshes.len(), 1);
        assert_eq!(meshes[0].name(), Some("AMESH".to_string()));
        assert!(meshes[0].positions().is_empty());
    }

    #[test]
    fn load_surfaces_header_errors_instead_of_panicking() {
        assert!(load(&[0, 1, 2]).is_err());
    }

    /// `scale=8, center=(1,2,3)`, one vertex `(256,0,-128)` decodes to
    /// `(1 + 1.0, 2 + 0.0, 3 + -0.5)` — the mesh center is added to every
    /// vertex, per the asset-rendering lineage pinned in DESIGN.md.
    #[test]
    fn mesh_positions_add_the_mesh_center() {
        let mut data = Vec::new();
        data.extend_from_slice(&0x54503d02u32.to_le_bytes());
        data.extend_from_slice(&0x1000C800u32.to_le_bytes());
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes()); // string_hash_size
        data.extend_from_slice(&0u32.to_le_bytes());

        let mut body = Vec::new();
        body.extend_from_slice(&0u32.to_le_bytes()); // flags
        body.extend_from_slice(&0i32.to_le_bytes()); // material_palette_reference
        body.extend_from_slice(&0i32.to_le_bytes()); // animated_vertices_reference
        body.extend_from_slice(&0i32.to_le_bytes()); // unknown_reference_3
        body.extend_from_slice(&0i32.to_le_bytes()); // unknown_reference_4
        body.extend_from_slice(&1.0f32.to_le_bytes()); // center.x
        body.extend_from_slice(&2.0f32.to_le_bytes()); // center.y
        body.extend_from_slice(&3.0f32.to_le_bytes()); // center.z
        body.extend(std::iter::repeat(0u8).take(3 * 4)); // params2
        body.extend_from_slice(&0f32.to_le_bytes()); // max_distance
        body.extend(std::iter::repeat(0u8).take(3 * 4)); // min
        body.extend(std::iter::repeat(0u8).take(3 * 4)); // max
        body.extend_from_slice(&1u16.to_le_bytes()); // position_count
        for _ in 0..8 {
            body.extend_from_slice(&0u16.to_le_bytes()); // remaining counts
        }
        body.extend_from_slice(&8u16.to_le_bytes()); // scale
        body.extend_from_slice(&256i16.to_le_bytes());
        body.extend_from_slice(&0i16.to_le_bytes());
        body.extend_from_slice(&(-128i16).to_le_bytes());

        data.extend_from_slice(&((body.len() + 4) as u32).to_le_bytes());
        data.extend_from_slice(&0x36u32.to_le_bytes());
        data.extend_from_slice(&0i32.to_le_bytes());
        data.extend_from_slice(&body);

        let wld = load(&data).unwrap();
        let mesh = wld.meshes().next().unwrap();
        let positions = mesh.positions();
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0], [2.0, 2.0, 2.5]);
    }
}
