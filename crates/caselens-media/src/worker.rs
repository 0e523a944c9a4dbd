// crates/caselens-media/src/worker.rs
//
// MediaWorker: owns the scrub frame slot and every background evidence job.
// All public API that caselens-ui calls lives here.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, Condvar, atomic::{AtomicBool, Ordering}};
use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender};
use ffmpeg_the_third::format::Pixel;
use uuid::Uuid;

use caselens_core::geometry::NativeRect;
use caselens_core::media_types::{EvidenceBundle, MediaResult};
use caselens_core::overlay::RegionOfInterest;

use crate::audio;
use crate::decode::FrameDecoder;
use crate::error::MediaError;
use crate::probe;
use crate::region;
use crate::sample;
use crate::still;

// ── Internal types ────────────────────────────────────────────────────────────

struct FrameRequest {
    id:        Uuid,
    path:      PathBuf,
    timestamp: f64,
}

// ── MediaWorker ───────────────────────────────────────────────────────────────

pub struct MediaWorker {
    /// Shared result channel: probes, ingest progress, regions, stills.
    pub rx: Receiver<MediaResult>,
    tx:     Sender<MediaResult>,

    /// Dedicated channel for on-demand scrub ViewFrame results.
    ///
    /// Scrub frames are the latency-critical traffic: during a busy import
    /// the shared channel fills and a frame the analyst is waiting on would
    /// queue behind probe results. A separate channel keeps scrub
    /// responsiveness independent of ingest load.
    ///
    /// Capacity = 8: the slot is latest-wins, so at most one in-flight
    /// request exists at a time; 8 gives headroom for back-to-back requests
    /// during rapid scrubbing.
    pub scrub_rx: Receiver<MediaResult>,

    /// Latest-wins slot for scrub frame requests.
    frame_req: Arc<(Mutex<Option<FrameRequest>>, Condvar)>,
    shutdown:  Arc<AtomicBool>,
    /// Limits concurrent probe threads: (active_count, Condvar).
    probe_sem: Arc<(Mutex<u32>, Condvar)>,
    /// Per-source ingest cancel flags. Re-running ingest for a source
    /// cancels and replaces the prior run's flag.
    ingest_cancels: Arc<Mutex<HashMap<Uuid, Arc<AtomicBool>>>>,
}

impl MediaWorker {
    pub fn new() -> Self {
        let (tx, rx)             = bounded(512);
        let (scrub_tx, scrub_rx) = bounded(8);

        let frame_req: Arc<(Mutex<Option<FrameRequest>>, Condvar)> =
            Arc::new((Mutex::new(None), Condvar::new()));

        // ── Scrub frame decode thread ─────────────────────────────────────────
        // Blocks on the latest-wins slot; keeps one FrameDecoder open and
        // reuses it while requests stay on the same source.
        let slot = Arc::clone(&frame_req);
        thread::spawn(move || {
            let mut live: Option<FrameDecoder> = None;
            loop {
                let req = {
                    let (lock, cvar) = &*slot;
                    let mut guard = lock.lock().unwrap();
                    while guard.is_none() {
                        guard = cvar.wait(guard).unwrap();
                    }
                    guard.take().unwrap()
                };

                // Poison-pill: a request with a nil id signals shutdown.
                if req.id == Uuid::nil() { return; }

                if live.as_ref().map(|d| d.path != req.path).unwrap_or(true) {
                    live = match FrameDecoder::open(&req.path) {
                        Ok(d)  => Some(d),
                        Err(e) => {
                            tracing::warn!("scrub decoder open: {e}");
                            None
                        }
                    };
                }
                if let Some(d) = &mut live {
                    let (w, h) = d.preview_dims();
                    match d.frame_at(req.timestamp, w, h, Pixel::RGBA) {
                        Ok(f) => {
                            let _ = scrub_tx.send(MediaResult::ViewFrame {
                                id:        req.id,
                                timestamp: req.timestamp,
                                width:     f.width,
                                height:    f.height,
                                data:      f.data,
                            });
                        }
                        Err(e) => {
                            // Drop the pipeline so the next request reopens.
                            tracing::warn!("scrub decode: {e}");
                            live = None;
                        }
                    }
                }
            }
        });

        Self {
            rx, tx, scrub_rx, frame_req,
            shutdown:       Arc::new(AtomicBool::new(false)),
            probe_sem:      Arc::new((Mutex::new(0), Condvar::new())),
            ingest_cancels: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
        // Cancel any in-flight ingest runs.
        let cancels = self.ingest_cancels.lock().unwrap();
        for flag in cancels.values() {
            flag.store(true, Ordering::Relaxed);
        }
        // Wake the scrub decode thread with a poison-pill so it exits cleanly
        // instead of blocking forever on the condvar.
        let (lock, cvar) = &*self.frame_req;
        *lock.lock().unwrap() = Some(FrameRequest {
            id:        Uuid::nil(),
            path:      PathBuf::new(),
            timestamp: 0.0,
        });
        cvar.notify_one();
    }

    /// Probe a newly added source for duration and native dimensions.
    pub fn probe_source(&self, id: Uuid, path: PathBuf) {
        let tx  = self.tx.clone();
        let sd  = self.shutdown.clone();
        let sem = self.probe_sem.clone();

        // A gatekeeper thread acquires the semaphore *before* the real work
        // starts, so a folder drop of dozens of files parks at most
        // PROBE_CONCURRENCY + 1 threads instead of one per file.
        thread::spawn(move || {
            const PROBE_CONCURRENCY: u32 = 4;
            {
                let (lock, cvar) = &*sem;
                let mut count = lock.lock().unwrap();
                while *count >= PROBE_CONCURRENCY {
                    count = cvar.wait(count).unwrap();
                }
                *count += 1;
            }
            // RAII release guard — decrements count and wakes the next waiter.
            struct SemGuard(Arc<(Mutex<u32>, Condvar)>);
            impl Drop for SemGuard {
                fn drop(&mut self) {
                    let (lock, cvar) = &*self.0;
                    *lock.lock().unwrap() -= 1;
                    cvar.notify_one();
                }
            }
            let _guard = SemGuard(sem);

            if sd.load(Ordering::Relaxed) { return; }
            match probe::probe_source(&path) {
                Ok(info) => { let _ = tx.send(MediaResult::SourceProbed { id, info }); }
                Err(e)   => { let _ = tx.send(MediaResult::SourceFailed { id, error: e.to_string() }); }
            }
        });
    }

    /// Ask the scrub thread for the frame at `timestamp`. Overwrites any
    /// pending request — the decode thread always gets the freshest one.
    pub fn request_frame(&self, id: Uuid, path: PathBuf, timestamp: f64) {
        let (lock, cvar) = &*self.frame_req;
        *lock.lock().unwrap() = Some(FrameRequest { id, path, timestamp });
        cvar.notify_one();
    }

    /// Start an evidence ingest run: sample `frame_count` stills, then try
    /// audio. Results come back tagged with `generation`; the session drops
    /// anything stale.
    ///
    /// A prior run for the same source is cancelled and superseded.
    pub fn start_ingest(
        &self,
        id:            Uuid,
        generation:    u64,
        path:          PathBuf,
        duration_secs: f64,
        frame_count:   usize,
    ) {
        let cancel = Arc::new(AtomicBool::new(false));
        let tx     = self.tx.clone();
        let sd     = self.shutdown.clone();

        // Register (and supersede) before spawning — avoids a window where
        // cancel_ingest runs before the thread has inserted its flag.
        {
            let mut map = self.ingest_cancels.lock().unwrap();
            if let Some(old) = map.insert(id, Arc::clone(&cancel)) {
                old.store(true, Ordering::Relaxed);
            }
        }

        let cancels_ref = Arc::clone(&self.ingest_cancels);
        thread::spawn(move || {
            if !sd.load(Ordering::Relaxed) {
                run_ingest(id, generation, &path, duration_secs, frame_count, &cancel, &tx);
            }
            // Deregister only our own flag; a superseding run may have
            // replaced it already.
            let mut map = cancels_ref.lock().unwrap();
            if map.get(&id).is_some_and(|f| Arc::ptr_eq(f, &cancel)) {
                map.remove(&id);
            }
        });
    }

    /// Signal the ingest run for `id` to stop after its current frame.
    pub fn cancel_ingest(&self, id: Uuid) {
        if let Some(flag) = self.ingest_cancels.lock().unwrap().get(&id) {
            flag.store(true, Ordering::Relaxed);
        }
    }

    /// Capture one region of the frame at `timestamp` at full native
    /// resolution, with `contrast` baked in.
    pub fn capture_region(
        &self,
        region_id: Uuid,
        path:      PathBuf,
        timestamp: f64,
        rect:      NativeRect,
        contrast:  f32,
    ) {
        let tx = self.tx.clone();
        let sd = self.shutdown.clone();
        thread::spawn(move || {
            if sd.load(Ordering::Relaxed) { return; }
            match region::capture_region(&path, timestamp, &rect, contrast) {
                Ok(jpeg) => {
                    let region = RegionOfInterest {
                        id:       region_id,
                        rect,
                        taken_at: timestamp,
                        jpeg,
                        answer:   None,
                    };
                    let _ = tx.send(MediaResult::RegionReady { region: Box::new(region) });
                }
                Err(e) => {
                    let _ = tx.send(MediaResult::RegionFailed { region_id, error: e.to_string() });
                }
            }
        });
    }

    /// Export the frame at `timestamp` as a native-resolution PNG.
    pub fn save_still(&self, path: PathBuf, timestamp: f64, contrast: f32, dest: PathBuf) {
        let tx = self.tx.clone();
        let sd = self.shutdown.clone();
        thread::spawn(move || {
            if sd.load(Ordering::Relaxed) { return; }
            match still::save_still(&path, timestamp, contrast, &dest) {
                Ok(path) => { let _ = tx.send(MediaResult::StillSaved { path }); }
                Err(e)   => { let _ = tx.send(MediaResult::StillFailed { error: e.to_string() }); }
            }
        });
    }
}

// ── Ingest run ────────────────────────────────────────────────────────────────

/// One complete ingest: frames first (fatal on failure), then audio
/// (absorbed on failure). Sends progress along the way and exactly one of
/// IngestDone / IngestFailed at the end — or nothing when cancelled.
fn run_ingest(
    id:            Uuid,
    generation:    u64,
    path:          &PathBuf,
    duration_secs: f64,
    frame_count:   usize,
    cancel:        &AtomicBool,
    tx:            &Sender<MediaResult>,
) {
    let frames = match sample::sample_frames(path, duration_secs, frame_count, cancel, |done, total| {
        let _ = tx.send(MediaResult::IngestProgress { id, generation, done, total });
    }) {
        Ok(frames)                   => frames,
        Err(MediaError::Cancelled)   => return,
        Err(e) => {
            let _ = tx.send(MediaResult::IngestFailed { id, generation, error: e.to_string() });
            return;
        }
    };

    if cancel.load(Ordering::Relaxed) { return; }

    // Audio is optional evidence. A source with no track (or an undecodable
    // one) still produces a valid package.
    let audio = match audio::extract_clip(path) {
        Ok(clip) => Some(clip),
        Err(e) => {
            tracing::warn!("audio unavailable for {}: {e}", path.display());
            None
        }
    };

    if cancel.load(Ordering::Relaxed) { return; }

    let bundle = EvidenceBundle { frames, audio };
    let _ = tx.send(MediaResult::IngestDone { id, generation, bundle });
}
