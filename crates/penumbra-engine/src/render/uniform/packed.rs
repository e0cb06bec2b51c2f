use super::value::Std140Value;

/// Size of one alignment chunk in a uniform block.
pub const CHUNK_SIZE: usize = 16;

/// CPU-side byte image of a uniform block.
///
/// Fields are packed left to right inside 16-byte chunks. A field that does not
/// fit into what is left of the current chunk starts at the next boundary, and
/// the gap is zero-filled. Struct and array-element boundaries are closed
/// explicitly with [`finish_chunk`](Self::finish_chunk).
///
/// This is the only way bytes get into a block; there is no raw offset API.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackedBuffer {
    bytes: Vec<u8>,
    chunk_offset: usize,
}

impl PackedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
            chunk_offset: 0,
        }
    }

    /// Appends a scalar, vector or matrix.
    pub fn push<T: Std140Value>(&mut self, value: T) {
        if T::SIZE == 0 {
            return;
        }
        self.reserve_field(T::SIZE);
        let start = self.bytes.len();
        value.append_to(&mut self.bytes);
        debug_assert_eq!(self.bytes.len() - start, T::SIZE);
        self.advance(T::SIZE);
    }

    /// Appends a contiguous run of plain values as a single field.
    ///
    /// No per-element padding is inserted. For arrays of structs the caller
    /// packs element by element and closes each with `finish_chunk`.
    pub fn push_slice<T: bytemuck::Pod>(&mut self, values: &[T]) {
        let raw: &[u8] = bytemuck::cast_slice(values);
        if raw.is_empty() {
            return;
        }
        self.reserve_field(raw.len());
        self.bytes.extend_from_slice(raw);
        self.advance(raw.len());
    }

    /// Pads with zeros until the next write starts on a chunk boundary.
    pub fn finish_chunk(&mut self) {
        if self.chunk_offset == 0 {
            return;
        }
        let pad = CHUNK_SIZE - self.chunk_offset;
        self.bytes.resize(self.bytes.len() + pad, 0);
        self.chunk_offset = 0;
    }

    /// Empties the buffer. The allocation is kept for the next frame.
    pub fn clear(&mut self) {
        self.bytes.clear();
        self.chunk_offset = 0;
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.bytes.capacity()
    }

    /// Write position inside the current chunk (`0..16`).
    #[inline]
    pub fn chunk_offset(&self) -> usize {
        self.chunk_offset
    }

    fn reserve_field(&mut self, size: usize) {
        if self.chunk_offset + size > CHUNK_SIZE {
            self.finish_chunk();
        }
    }

    fn advance(&mut self, size: usize) {
        self.chunk_offset = (self.chunk_offset + size) % CHUNK_SIZE;
    }
}
