use crate::cursor::UnexpectedEof;

/// Errors surfaced while decoding a WLD document.
///
/// Unknown fragment *types* are not represented here: per the format's own
/// "tolerate, don't abort" posture, an unrecognized `fragment_type` decodes
/// as [`crate::FragmentType::Unknown`] rather than failing the parse. Only
/// structurally broken input — a body shorter than its schema demands —
/// surfaces an error, and it aborts just the current document, not the
/// caller's whole archive walk.
#[derive(Debug, thiserror::Error)]
pub enum WldError {
    #[error("fragment {index} ({fragment_type:#x}): {source}")]
    Fragment {
        index: usize,
        fragment_type: u32,
        #[source]
        source: UnexpectedEof,
    },
    #[error("header: {0}")]
    Header(UnexpectedEof),
}
