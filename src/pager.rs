//! Page cache over the database file.
//!
//! Pages are loaded on first use and stay cached until [`Pager::close`];
//! there is no eviction and no dirty tracking, so every loaded page is
//! written back on close.

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::{debug, trace};

use crate::error::{DbError, Result};
use crate::node::Page;
use crate::{PAGE_SIZE, TABLE_MAX_PAGES};

pub struct Pager {
    file: File,
    file_length: u64,
    num_pages: u32,
    pages: Vec<Option<Box<Page>>>,
}

impl Pager {
    /// Opens `path` for reading and writing, creating it if absent.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let file_length = file.metadata()?.len();
        if file_length % PAGE_SIZE as u64 != 0 {
            return Err(DbError::CorruptFile {
                length: file_length,
            });
        }
        let num_pages = (file_length / PAGE_SIZE as u64) as u32;
        debug!(path = %path.display(), file_length, num_pages, "opened database file");

        Ok(Self {
            file,
            file_length,
            num_pages,
            pages: std::iter::repeat_with(|| None).take(TABLE_MAX_PAGES).collect(),
        })
    }

    pub fn file_length(&self) -> u64 {
        self.file_length
    }

    pub fn num_pages(&self) -> u32 {
        self.num_pages
    }

    /// Next page number past the end of the file. Pages are never reused.
    pub fn unused_page_num(&self) -> u32 {
        self.num_pages
    }

    pub fn get_page(&mut self, page_num: u32) -> Result<&mut Page> {
        let slot = page_num as usize;
        if slot >= TABLE_MAX_PAGES {
            return Err(DbError::PageOutOfBounds {
                page_num,
                max: TABLE_MAX_PAGES,
            });
        }

        let Self {
            file,
            file_length,
            num_pages,
            pages,
        } = self;
        let cached = &mut pages[slot];
        let page = match *cached {
            Some(ref mut page) => page,
            None => {
                let mut page = Box::new([0u8; PAGE_SIZE]);
                let offset = page_num as u64 * PAGE_SIZE as u64;
                if offset < *file_length {
                    read_at(file, offset, &mut page[..])?;
                    trace!(page_num, "loaded page from disk");
                } else {
                    trace!(page_num, "allocated fresh page");
                }
                if page_num >= *num_pages {
                    *num_pages = page_num + 1;
                }
                cached.insert(page)
            }
        };
        Ok(&mut **page)
    }

    pub fn flush(&mut self, page_num: u32) -> Result<()> {
        let page = self
            .pages
            .get(page_num as usize)
            .and_then(|slot| slot.as_deref())
            .ok_or(DbError::FlushEmptyPage(page_num))?;

        self.file
            .seek(SeekFrom::Start(page_num as u64 * PAGE_SIZE as u64))?;
        self.file.write_all(page)?;
        debug!(page_num, "flushed page");
        Ok(())
    }

    /// Writes back every cached page and releases the file.
    pub fn close(mut self) -> Result<()> {
        for page_num in 0..self.num_pages {
            if self.pages[page_num as usize].is_none() {
                continue;
            }
            self.flush(page_num)?;
            self.pages[page_num as usize] = None;
        }
        self.file.flush()?;
        debug!(num_pages = self.num_pages, "closed database file");
        Ok(())
    }
}

// Reads until `buf` is full or the file ends; the rest stays zeroed.
fn read_at(file: &mut File, offset: u64, buf: &mut [u8]) -> Result<()> {
    file.seek(SeekFrom::Start(offset))?;
    let mut filled = 0;
    while filled < buf.len() {
        match file.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}
