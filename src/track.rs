// src/track.rs
//
// Drop accounting for leak assertions in unit tests. Counters are
// thread-local so parallel test threads do not interfere.

use std::cell::Cell;

thread_local! {
    static TRACK_DROPS: Cell<bool> = Cell::new(false);
    static LIVE_RASTERS: Cell<usize> = Cell::new(0);
    static LIVE_RGB_BUFFERS: Cell<usize> = Cell::new(0);
    static LIVE_AVIF_IMAGES: Cell<usize> = Cell::new(0);
}

pub(crate) struct TrackingGuard;

impl Drop for TrackingGuard {
    fn drop(&mut self) {
        TRACK_DROPS.with(|t| t.set(false));
    }
}

/// Reset all counters and enable accounting until the guard drops.
pub(crate) fn enable() -> TrackingGuard {
    TRACK_DROPS.with(|t| t.set(true));
    LIVE_RASTERS.with(|c| c.set(0));
    LIVE_RGB_BUFFERS.with(|c| c.set(0));
    LIVE_AVIF_IMAGES.with(|c| c.set(0));
    TrackingGuard
}

fn bump(counter: &'static std::thread::LocalKey<Cell<usize>>) {
    TRACK_DROPS.with(|t| {
        if t.get() {
            counter.with(|c| c.set(c.get() + 1));
        }
    });
}

fn shrink(counter: &'static std::thread::LocalKey<Cell<usize>>) {
    TRACK_DROPS.with(|t| {
        if t.get() {
            counter.with(|c| c.set(c.get().saturating_sub(1)));
        }
    });
}

pub(crate) fn raster_created() {
    bump(&LIVE_RASTERS);
}

pub(crate) fn raster_dropped() {
    shrink(&LIVE_RASTERS);
}

pub(crate) fn live_rasters() -> usize {
    LIVE_RASTERS.with(|c| c.get())
}

pub(crate) fn rgb_created() {
    bump(&LIVE_RGB_BUFFERS);
}

pub(crate) fn rgb_dropped() {
    shrink(&LIVE_RGB_BUFFERS);
}

pub(crate) fn live_rgb_buffers() -> usize {
    LIVE_RGB_BUFFERS.with(|c| c.get())
}

pub(crate) fn avif_image_created() {
    bump(&LIVE_AVIF_IMAGES);
}

pub(crate) fn avif_image_dropped() {
    shrink(&LIVE_AVIF_IMAGES);
}

pub(crate) fn live_avif_images() -> usize {
    LIVE_AVIF_IMAGES.with(|c| c.get())
}
