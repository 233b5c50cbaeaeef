// Mon Oct 19 2026 - Alex

use bitflags::bitflags;
use std::fmt;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Protection: u32 {
        const READ = 1;
        const WRITE = 2;
        const EXEC = 4;
        const SHARED = 8;
        const PRIVATE = 16;
    }
}

impl Protection {
    /// Parses the `rwxp` column of a maps line.
    pub fn from_perms(perms: &str) -> Option<Self> {
        let bytes = perms.as_bytes();
        if bytes.len() < 4 {
            return None;
        }

        let mut prot = Self::empty();
        if bytes[0] == b'r' {
            prot |= Self::READ;
        }
        if bytes[1] == b'w' {
            prot |= Self::WRITE;
        }
        if bytes[2] == b'x' {
            prot |= Self::EXEC;
        }
        match bytes[3] {
            b's' => prot |= Self::SHARED,
            b'p' => prot |= Self::PRIVATE,
            _ => {}
        }
        Some(prot)
    }

    pub fn can_read(self) -> bool {
        self.contains(Self::READ)
    }

    pub fn can_write(self) -> bool {
        self.contains(Self::WRITE)
    }

    pub fn can_execute(self) -> bool {
        self.contains(Self::EXEC)
    }
}

impl fmt::Display for Protection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = |set: bool, c: char| if set { c } else { '-' };
        let kind = if self.contains(Self::SHARED) {
            's'
        } else if self.contains(Self::PRIVATE) {
            'p'
        } else {
            '-'
        };
        write!(
            f,
            "{}{}{}{}",
            flag(self.can_read(), 'r'),
            flag(self.can_write(), 'w'),
            flag(self.can_execute(), 'x'),
            kind
        )
    }
}
