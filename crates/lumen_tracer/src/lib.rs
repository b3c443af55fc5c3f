//! Lumen Tracer - ray emission and trajectory output.
//!
//! Samples rays from the sources of a [`lumen_core::Scene`] in parallel
//! chunks and writes them out for viewing: coloured OBJ line segments,
//! JSON or CSV records, and spectrum strip images.

mod emission;
mod export;
mod spectrum;

pub use emission::{
    emit, emit_chunk, emit_scene, generate_chunks, EmissionChunk, EmissionConfig, SourceBatch,
    DEFAULT_CHUNK_SIZE,
};
pub use export::{
    export_csv, export_json, export_obj, ExportError, ExportOptions, ExportResult, RayRecord,
    Trajectory,
};
pub use spectrum::{save_spectrum, spectrum_image};
