// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! In-memory backend: one flat buffer in storage order.

use crate::contracts::check_open;
use crate::error::StorageResult;
use crate::layout::DatasetLayout;

use super::DatasetStorage;

/// Dataset held entirely in memory.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    layout: DatasetLayout,
    data: Vec<f32>,
    closed: bool,
}

impl MemoryStorage {
    /// Zero-filled buffer sized to the layout's stored points.
    pub fn new(layout: DatasetLayout) -> Self {
        let len = layout.stored_point_count() as usize;
        Self {
            layout,
            data: vec![0.0; len],
            closed: false,
        }
    }

    /// Raw buffer in storage order.
    pub fn as_slice(&self) -> &[f32] {
        check_open(self.closed, "memory dataset");
        &self.data
    }

    fn index_of(&self, indices: &[usize]) -> usize {
        check_open(self.closed, "memory dataset");
        self.layout.point_offset(indices) as usize
    }
}

impl DatasetStorage for MemoryStorage {
    fn layout(&self) -> &DatasetLayout {
        &self.layout
    }

    fn get_float(&mut self, indices: &[usize]) -> StorageResult<f32> {
        let i = self.index_of(indices);
        Ok(self.data[i])
    }

    fn set_float(&mut self, value: f32, indices: &[usize]) -> StorageResult<()> {
        let i = self.index_of(indices);
        self.data[i] = value;
        Ok(())
    }

    fn zero(&mut self) -> StorageResult<()> {
        check_open(self.closed, "memory dataset");
        self.data.fill(0.0);
        Ok(())
    }

    fn write_header(&mut self, _force_full_rewrite: bool) -> StorageResult<()> {
        check_open(self.closed, "memory dataset");
        Ok(())
    }

    fn close(&mut self) -> StorageResult<()> {
        if !self.closed {
            self.data = Vec::new();
            self.closed = true;
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}
