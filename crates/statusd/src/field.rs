use std::fmt;

/// Maximum number of content bytes a single field may hold. The backing
/// storage reserves one extra byte so `data[length]` is always a terminator.
pub const MAX_FIELD_LEN: usize = 255;

/// One slot of the status line. The declaration order here is also the
/// render order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum FieldId {
    Time,
    Load,
    Temp,
    Volume,
    Mic,
    Memory,
    Governor,
    Lang,
    Weather,
    Date,
}

impl FieldId {
    pub const ALL: [FieldId; 10] = [
        FieldId::Time,
        FieldId::Load,
        FieldId::Temp,
        FieldId::Volume,
        FieldId::Mic,
        FieldId::Memory,
        FieldId::Governor,
        FieldId::Lang,
        FieldId::Weather,
        FieldId::Date,
    ];
    pub const COUNT: usize = Self::ALL.len();

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldId::Time => "time",
            FieldId::Load => "load",
            FieldId::Temp => "temp",
            FieldId::Volume => "volume",
            FieldId::Mic => "mic",
            FieldId::Memory => "memory",
            FieldId::Governor => "governor",
            FieldId::Lang => "lang",
            FieldId::Weather => "weather",
            FieldId::Date => "date",
        };
        write!(f, "{}", name)
    }
}

/// Fixed-capacity text buffer for one field. `data[..length]` is the current
/// value, `data[length]` is always 0, and anything past that is garbage that
/// must never be read.
#[derive(Debug, Clone, Copy)]
pub struct FieldBuffer {
    length: usize,
    data: [u8; MAX_FIELD_LEN + 1],
}

impl FieldBuffer {
    fn new() -> Self {
        FieldBuffer { length: 0, data: [0; MAX_FIELD_LEN + 1] }
    }

    /// Copy up to [MAX_FIELD_LEN] bytes from `src`, silently dropping the
    /// rest. One trailing newline is stripped, if present after truncation.
    fn write(&mut self, src: &[u8]) {
        let mut length = src.len().min(MAX_FIELD_LEN);
        if length > 0 && src[length - 1] == b'\n' {
            length -= 1;
        }
        self.data[..length].copy_from_slice(&src[..length]);
        self.data[length] = 0;
        self.length = length;
    }

    pub fn content(&self) -> &[u8] {
        &self.data[..self.length]
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

/// All field buffers of the daemon, allocated once and mutated in place.
/// Every write happens on the single dispatch thread, so there is no locking.
pub struct FieldStore {
    fields: [FieldBuffer; FieldId::COUNT],
}

impl FieldStore {
    pub fn new() -> Self {
        FieldStore { fields: [FieldBuffer::new(); FieldId::COUNT] }
    }

    pub fn write(&mut self, id: FieldId, src: &[u8]) {
        self.fields[id.index()].write(src);
    }

    pub fn read(&self, id: FieldId) -> &FieldBuffer {
        &self.fields[id.index()]
    }
}
