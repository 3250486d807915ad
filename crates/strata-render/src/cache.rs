//! Resource caches that outlive a frame.
//!
//! Textures and render targets are GPU resources and are released through
//! the pipeline when the canvas is dropped. Glyph outlines are plain data.

use std::sync::Arc;

use strata_core::StrataResult;
use strata_core::alloc::HashMap;
use strata_geometry::{Path, Pixmap};
use tracing::{debug, trace};

use crate::glyph::{GlyphId, GlyphSource};
use crate::pipeline::{Pipeline, RenderTargetHandle, TextureHandle};

/// Address identity of an `Arc`, stable while the `Arc` is alive.
fn arc_key<T: ?Sized>(arc: &Arc<T>) -> usize {
    Arc::as_ptr(arc).cast::<()>() as usize
}

/// Textures keyed by pixmap identity.
///
/// The cache holds a clone of every pixmap it uploaded so the address cannot
/// be reused by another allocation while the entry exists.
#[derive(Debug, Default)]
pub struct TextureCache {
    entries: HashMap<usize, (Arc<Pixmap>, TextureHandle)>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached texture for `pixmap`, uploading it on first use.
    pub fn get_or_create(
        &mut self,
        pipeline: &dyn Pipeline,
        pixmap: &Arc<Pixmap>,
    ) -> StrataResult<TextureHandle> {
        let key = arc_key(pixmap);
        if let Some((_, handle)) = self.entries.get(&key) {
            return Ok(*handle);
        }
        let handle = pipeline.create_texture(pixmap)?;
        trace!(
            "uploaded {}x{} texture {:?}",
            pixmap.width(),
            pixmap.height(),
            handle
        );
        self.entries.insert(key, (Arc::clone(pixmap), handle));
        Ok(handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn release_all(&mut self, pipeline: &dyn Pipeline) {
        for (_, (_, handle)) in self.entries.drain() {
            pipeline.release_texture(handle);
        }
    }
}

/// Outline paths keyed by (source identity, glyph id).
#[derive(Default)]
pub struct GlyphCache {
    sources: HashMap<usize, Arc<dyn GlyphSource>>,
    paths: HashMap<(usize, GlyphId), Option<Arc<Path>>>,
}

impl std::fmt::Debug for GlyphCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphCache")
            .field("sources", &self.sources.len())
            .field("paths", &self.paths.len())
            .finish()
    }
}

impl GlyphCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Outline of `glyph`, asking `source` only on the first request.
    /// Glyphs without an outline are remembered too.
    pub fn get(&mut self, source: &Arc<dyn GlyphSource>, glyph: GlyphId) -> Option<Arc<Path>> {
        let key = arc_key(source);
        self.sources
            .entry(key)
            .or_insert_with(|| Arc::clone(source));
        self.paths
            .entry((key, glyph))
            .or_insert_with(|| source.glyph_path(glyph).map(Arc::new))
            .clone()
    }

    /// Number of cached lookups, including misses.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn clear(&mut self) {
        self.sources.clear();
        self.paths.clear();
    }
}

/// Frames a render target may sit unused before it is released.
pub const MAX_TARGET_AGE: u64 = 60;

#[derive(Debug, Clone, Copy)]
struct TargetInfo {
    target: RenderTargetHandle,
    age: u64,
    used: bool,
}

/// Offscreen targets for layers, pooled by size.
///
/// A target is handed out at most once per frame; [`begin_frame`] makes
/// every target available again.
///
/// [`begin_frame`]: RenderTargetCache::begin_frame
#[derive(Debug, Default)]
pub struct RenderTargetCache {
    targets: HashMap<(u32, u32), Vec<TargetInfo>>,
    current_age: u64,
}

impl RenderTargetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_frame(&mut self) {
        self.current_age += 1;
        for info in self.targets.values_mut().flatten() {
            info.used = false;
        }
    }

    /// A target of the given size not yet used this frame.
    pub fn acquire(
        &mut self,
        pipeline: &dyn Pipeline,
        width: u32,
        height: u32,
    ) -> StrataResult<RenderTargetHandle> {
        let age = self.current_age;
        let list = self.targets.entry((width, height)).or_default();
        if let Some(info) = list.iter_mut().find(|info| !info.used) {
            info.used = true;
            info.age = age;
            return Ok(info.target);
        }

        let target = pipeline.create_render_target(width, height)?;
        debug!("created {}x{} render target {}", width, height, target.id);
        list.push(TargetInfo {
            target,
            age,
            used: true,
        });
        Ok(target)
    }

    /// Release targets unused for more than `max_age` frames.
    pub fn purge(&mut self, pipeline: &dyn Pipeline, max_age: u64) {
        let now = self.current_age;
        for list in self.targets.values_mut() {
            list.retain(|info| {
                let keep = now.saturating_sub(info.age) <= max_age;
                if !keep {
                    pipeline.release_render_target(info.target);
                }
                keep
            });
        }
        self.targets.retain(|_, list| !list.is_empty());
    }

    pub fn len(&self) -> usize {
        self.targets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn release_all(&mut self, pipeline: &dyn Pipeline) {
        for (_, list) in self.targets.drain() {
            for info in list {
                pipeline.release_render_target(info.target);
            }
        }
    }
}
