//! Lazy, caching game-by-game reader over an indexed PGN archive (C8).

use std::collections::{HashMap, VecDeque};

use crate::error::PgnError;
use crate::game::Game;

use super::indexer::{index_games, GameIndex};
use super::parse_game;
use super::worker_pool::{DispatchOutcome, WorkerPool};

/// Cursor configuration. Field names and defaults follow §4.8 of the
/// design notes verbatim.
#[derive(Clone, Debug)]
pub struct CursorConfig {
    pub start: usize,
    pub length: Option<usize>,
    pub prefetch: usize,
    pub include_metadata: bool,
    pub cache_size: usize,
    pub lazy_parse: bool,
    pub strict: bool,
    pub workers: Option<usize>,
    pub worker_batch_size: usize,
}

impl Default for CursorConfig {
    fn default() -> Self {
        CursorConfig {
            start: 0,
            length: None,
            prefetch: 1,
            include_metadata: true,
            cache_size: 10,
            lazy_parse: true,
            strict: false,
            workers: None,
            worker_batch_size: 10,
        }
    }
}

/// A lazy reader over a multi-game PGN archive: indexes the whole text up
/// front (cheap — byte offsets and headers only) and parses individual
/// games on demand, with a FIFO-evicted cache.
///
/// Borrows the source text; the text must not be mutated while a `Cursor`
/// over it is live (the indexer's offsets would no longer line up).
pub struct Cursor<'a> {
    source: &'a str,
    indices: Vec<GameIndex>,
    config: CursorConfig,
    current: usize,
    cache: HashMap<usize, Game>,
    cache_order: VecDeque<usize>,
    errors: Vec<(usize, PgnError)>,
    on_error: Option<Box<dyn FnMut(&PgnError, usize) + 'a>>,
    pool: Option<WorkerPool>,
}

impl<'a> Cursor<'a> {
    #[must_use]
    pub fn new(source: &'a str, config: CursorConfig) -> Self {
        let indices = index_games(source);
        let pool = config.workers.map(WorkerPool::new);
        let current = config.start;
        Cursor {
            source,
            indices,
            config,
            current,
            cache: HashMap::new(),
            cache_order: VecDeque::new(),
            errors: Vec::new(),
            on_error: None,
            pool,
        }
    }

    pub fn set_on_error<F: FnMut(&PgnError, usize) + 'a>(&mut self, f: F) {
        self.on_error = Some(Box::new(f));
    }

    #[must_use]
    pub fn total_games(&self) -> usize {
        self.indices.len()
    }

    #[must_use]
    pub fn errors(&self) -> &[(usize, PgnError)] {
        &self.errors
    }

    fn bound(&self) -> usize {
        let total = self.indices.len();
        match self.config.length {
            Some(len) => (self.config.start + len).min(total),
            None => total,
        }
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.current < self.bound()
    }

    #[must_use]
    pub fn has_before(&self) -> bool {
        self.current > self.config.start
    }

    /// Parse and cache the game at `current`, advance, and prefetch ahead.
    /// Returns `Ok(None)` both when exhausted and — in non-strict mode —
    /// when the game at this index fails to parse; `errors()` is the only
    /// way to tell those apart.
    pub fn next(&mut self) -> Result<Option<Game>, PgnError> {
        if !self.has_next() {
            return Ok(None);
        }
        let i = self.current;
        self.current += 1;
        let parsed = self.parse_and_cache(i);
        let outcome = self.resolve(i, parsed);
        self.prefetch_ahead();
        outcome
    }

    pub fn before(&mut self) -> Result<Option<Game>, PgnError> {
        if !self.has_before() {
            return Ok(None);
        }
        self.current -= 1;
        let i = self.current;
        let parsed = self.parse_and_cache(i);
        self.resolve(i, parsed)
    }

    #[must_use]
    pub fn seek(&mut self, i: usize) -> bool {
        if i < self.total_games() {
            self.current = i;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.current = self.config.start;
        self.cache.clear();
        self.cache_order.clear();
    }

    /// Advance until a game whose pre-scanned headers satisfy `pred` is
    /// found, without parsing any skipped game.
    pub fn find_next<F: Fn(&[(String, String)]) -> bool>(&mut self, pred: F) -> Result<Option<Game>, PgnError> {
        while self.has_next() {
            if pred(&self.indices[self.current].headers) {
                return self.next();
            }
            self.current += 1;
        }
        Ok(None)
    }

    /// Re-serialize every game the cursor exposes, preserving `current`
    /// across the call.
    pub fn pgn(&mut self, newline: &str, max_width: usize) -> String {
        let saved = self.current;
        let bound = self.bound();
        let mut out = String::new();
        for i in self.config.start..bound {
            if let Ok(game) = self.parse_and_cache(i) {
                if !out.is_empty() {
                    out.push_str(newline);
                }
                out.push_str(&game.pgn(newline, max_width));
            }
        }
        self.current = saved;
        out
    }

    /// Parse up to `count` upcoming games as one unit, using the worker
    /// pool if configured. This is the synchronous surface for what the
    /// design calls async iteration: batched, index-ordered parsing ahead
    /// of the caller's single-game cursor position.
    pub fn parse_batch(&mut self, count: usize) -> Vec<(usize, Result<Game, PgnError>)> {
        let bound = self.bound();
        let end = (self.current + count).min(bound);
        let batch_indices: Vec<usize> = (self.current..end).collect();
        self.current = end;

        let mut slices: Vec<(usize, String)> = Vec::with_capacity(batch_indices.len());
        for i in &batch_indices {
            let idx = &self.indices[*i];
            slices.push((*i, self.source[idx.start_offset..idx.end_offset].to_string()));
        }

        let mut results: Vec<(usize, Result<Game, PgnError>)> = Vec::with_capacity(slices.len());
        let mut pool = self.pool.take();
        if let Some(p) = pool.as_mut() {
            let mut remaining = slices;
            while !remaining.is_empty() {
                let take = remaining.len().min(self.config.worker_batch_size);
                let batch: Vec<(usize, String)> = remaining.drain(..take).collect();
                match p.dispatch(batch, self.config.strict) {
                    DispatchOutcome::Parsed(batch_results) => results.extend(batch_results),
                    DispatchOutcome::TransportFailure { games, strict } => {
                        for (i, pgn) in games {
                            let headers = self.indices[i].headers.clone();
                            results.push((i, parse_game(&pgn, &headers, strict)));
                        }
                    }
                }
            }
        } else {
            for (i, pgn) in slices {
                let headers = self.indices[i].headers.clone();
                results.push((i, parse_game(&pgn, &headers, self.config.strict)));
            }
        }
        self.pool = pool;

        results.sort_by_key(|(i, _)| *i);
        for (i, r) in &results {
            match r {
                Ok(game) => self.insert_cache(*i, game.clone()),
                Err(e) => {
                    if let Some(cb) = self.on_error.as_mut() {
                        cb(e, *i);
                    }
                    self.errors.push((*i, e.clone()));
                }
            }
        }
        results
    }

    /// Reject pending worker tasks and join worker threads, if any.
    pub fn terminate(&mut self) {
        if let Some(pool) = self.pool.as_mut() {
            pool.terminate();
        }
    }

    fn resolve(&mut self, i: usize, result: Result<Game, PgnError>) -> Result<Option<Game>, PgnError> {
        match result {
            Ok(game) => Ok(Some(game)),
            Err(e) => {
                if self.config.strict {
                    return Err(e);
                }
                if let Some(cb) = self.on_error.as_mut() {
                    cb(&e, i);
                }
                self.errors.push((i, e));
                Ok(None)
            }
        }
    }

    fn parse_and_cache(&mut self, i: usize) -> Result<Game, PgnError> {
        if let Some(game) = self.cache.get(&i) {
            return Ok(game.clone());
        }
        let idx = &self.indices[i];
        let slice = &self.source[idx.start_offset..idx.end_offset];
        let game = parse_game(slice, &idx.headers, self.config.strict)?;
        self.insert_cache(i, game.clone());
        Ok(game)
    }

    fn insert_cache(&mut self, i: usize, game: Game) {
        if !self.cache.contains_key(&i) {
            self.cache_order.push_back(i);
            while self.cache_order.len() > self.config.cache_size {
                if let Some(oldest) = self.cache_order.pop_front() {
                    self.cache.remove(&oldest);
                }
            }
        }
        self.cache.insert(i, game);
    }

    fn prefetch_ahead(&mut self) {
        let bound = self.bound();
        let end = (self.current + self.config.prefetch).min(bound);
        for i in self.current..end {
            if !self.cache.contains_key(&i) {
                let _ = self.parse_and_cache(i);
            }
        }
    }
}
