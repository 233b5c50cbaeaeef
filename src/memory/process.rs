// Mon Oct 19 2026 - Alex

use crate::memory::{Address, MemoryError, RemoteMemory};
use crate::utils::{page_end, system_page_size};
use libc::{c_void, iovec, pid_t};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::os::unix::fs::FileExt;
use std::sync::Arc;

/// Which channel is used to reach the target's memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MemOp {
    /// `process_vm_readv` / `process_vm_writev`
    #[default]
    Syscall,
    /// `/proc/<pid>/mem`
    File,
}

pub fn open_remote(pid: i32, op: MemOp) -> Result<Arc<dyn RemoteMemory>, MemoryError> {
    if pid <= 0 {
        return Err(MemoryError::ProcessNotFound(format!("invalid pid {}", pid)));
    }

    let mem: Arc<dyn RemoteMemory> = match op {
        MemOp::Syscall => Arc::new(SyscallMemory::new(pid)?),
        MemOp::File => Arc::new(FileMemory::open(pid)?),
    };
    log::debug!("opened {:?} memory channel for pid {}", op, pid);
    Ok(mem)
}

// IOV_MAX on Linux.
const MAX_IOVECS: usize = 1024;

pub struct SyscallMemory {
    pid: pid_t,
    page_size: u64,
}

impl SyscallMemory {
    pub fn new(pid: i32) -> Result<Self, MemoryError> {
        if unsafe { libc::kill(pid, 0) } != 0 {
            return Err(MemoryError::ProcessNotFound(format!(
                "pid {}: {}",
                pid,
                std::io::Error::last_os_error()
            )));
        }
        Ok(Self {
            pid,
            page_size: system_page_size(),
        })
    }

    pub fn pid(&self) -> i32 {
        self.pid
    }

    /// One remote iovec per touched page, so an unmapped page only cuts the
    /// transfer short instead of failing it outright.
    fn remote_iovecs(&self, address: Address, len: usize) -> Vec<iovec> {
        let mut iovs = Vec::new();
        let mut current = address.as_u64();
        let mut remaining = len as u64;

        while remaining > 0 {
            let boundary = page_end(current + 1, self.page_size);
            let chunk = (boundary - current).min(remaining);
            iovs.push(iovec {
                iov_base: current as *mut c_void,
                iov_len: chunk as usize,
            });
            current += chunk;
            remaining -= chunk;
        }
        iovs
    }

    fn transfer(&self, address: Address, local: *mut u8, len: usize, write: bool) -> usize {
        if len == 0 || address.checked_add(len as u64).is_none() {
            return 0;
        }

        let remote = self.remote_iovecs(address, len);
        let mut done = 0usize;

        for batch in remote.chunks(MAX_IOVECS) {
            let batch_len: usize = batch.iter().map(|v| v.iov_len).sum();
            let local_iov = iovec {
                iov_base: unsafe { local.add(done) } as *mut c_void,
                iov_len: batch_len,
            };

            let result = unsafe {
                if write {
                    libc::process_vm_writev(self.pid, &local_iov, 1, batch.as_ptr(), batch.len() as _, 0)
                } else {
                    libc::process_vm_readv(self.pid, &local_iov, 1, batch.as_ptr(), batch.len() as _, 0)
                }
            };

            if result < 0 {
                log::trace!(
                    "process_vm_{}v({}, {}, {}) failed: {}",
                    if write { "write" } else { "read" },
                    self.pid,
                    address + done as u64,
                    batch_len,
                    std::io::Error::last_os_error()
                );
                break;
            }

            done += result as usize;
            if (result as usize) < batch_len {
                break;
            }
        }
        done
    }
}

impl RemoteMemory for SyscallMemory {
    fn read(&self, address: Address, buffer: &mut [u8]) -> usize {
        self.transfer(address, buffer.as_mut_ptr(), buffer.len(), false)
    }

    fn write(&self, address: Address, data: &[u8]) -> usize {
        // process_vm_writev only reads from the local iovec.
        self.transfer(address, data.as_ptr() as *mut u8, data.len(), true)
    }
}

pub struct FileMemory {
    pid: i32,
    file: File,
    writable: bool,
}

impl FileMemory {
    pub fn open(pid: i32) -> Result<Self, MemoryError> {
        let path = format!("/proc/{}/mem", pid);
        match OpenOptions::new().read(true).write(true).open(&path) {
            Ok(file) => Ok(Self {
                pid,
                file,
                writable: true,
            }),
            Err(e) => {
                log::debug!("{} not writable ({}), opening read-only", path, e);
                let file = File::open(&path).map_err(|e| match e.kind() {
                    std::io::ErrorKind::NotFound => {
                        MemoryError::ProcessNotFound(format!("pid {}", pid))
                    }
                    _ => MemoryError::Io(e),
                })?;
                Ok(Self {
                    pid,
                    file,
                    writable: false,
                })
            }
        }
    }

    pub fn pid(&self) -> i32 {
        self.pid
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }
}

impl RemoteMemory for FileMemory {
    fn read(&self, address: Address, buffer: &mut [u8]) -> usize {
        let mut done = 0;
        while done < buffer.len() {
            match self.file.read_at(&mut buffer[done..], address.as_u64() + done as u64) {
                Ok(0) => break,
                Ok(n) => done += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    log::trace!("pread({}, {}) failed: {}", address, buffer.len(), e);
                    break;
                }
            }
        }
        done
    }

    fn write(&self, address: Address, data: &[u8]) -> usize {
        if !self.writable {
            return 0;
        }

        let mut done = 0;
        while done < data.len() {
            match self.file.write_at(&data[done..], address.as_u64() + done as u64) {
                Ok(0) => break,
                Ok(n) => done += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    log::trace!("pwrite({}, {}) failed: {}", address, data.len(), e);
                    break;
                }
            }
        }
        done
    }
}
