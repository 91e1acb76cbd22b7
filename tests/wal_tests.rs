//! Tests for the batch WAL
//!
//! These tests verify:
//! - Entry serialization round-trip and CRC corruption detection
//! - Writer LSN sequencing and reopen
//! - Recovery from clean, empty, torn and corrupted logs

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use ordkv::config::WalSyncStrategy;
use ordkv::wal::{LogFile, WalEntry, WalReader, WalRecovery, WalWriter, HEADER_SIZE};
use ordkv::{BatchOp, OrdKvError};
use parking_lot::Mutex;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_wal() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let wal_path = temp_dir.path().join("test.wal");
    (temp_dir, wal_path)
}

fn put(key: &str, value: &str) -> BatchOp {
    BatchOp::Put {
        key: Bytes::copy_from_slice(key.as_bytes()),
        value: Bytes::copy_from_slice(value.as_bytes()),
    }
}

fn write_batches(path: &PathBuf, count: usize) {
    let mut writer = WalWriter::open(path, WalSyncStrategy::EveryWrite).unwrap();
    for i in 0..count {
        writer
            .append(vec![put(&format!("key{}", i), &format!("value{}", i))])
            .unwrap();
    }
}

/// In-memory log file with switchable faults
#[derive(Default)]
struct FaultState {
    data: Vec<u8>,
    fail_sync: bool,
    fail_write: bool,
    broken: bool,
    fail_set_len: bool,
}

#[derive(Clone, Default)]
struct FaultyFile(Arc<Mutex<FaultState>>);

impl FaultyFile {
    fn bytes(&self) -> Vec<u8> {
        self.0.lock().data.clone()
    }

    fn set(&self, f: impl FnOnce(&mut FaultState)) {
        f(&mut self.0.lock());
    }

    /// Entries a recovery would keep
    fn replayed(&self) -> Vec<WalEntry> {
        WalReader::from_bytes(self.bytes())
            .entries()
            .take_while(|e| e.is_ok())
            .map(|e| e.unwrap())
            .collect()
    }
}

impl Write for FaultyFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.0.lock();
        if state.fail_write {
            // Half the frame lands, then the device gives up
            let half = buf.len() / 2;
            state.data.extend_from_slice(&buf[..half]);
            state.fail_write = false;
            state.broken = true;
            return Ok(half);
        }
        if state.broken {
            return Err(io::Error::new(io::ErrorKind::Other, "device gone"));
        }
        state.data.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl LogFile for FaultyFile {
    fn sync_data(&self) -> io::Result<()> {
        if self.0.lock().fail_sync {
            return Err(io::Error::new(io::ErrorKind::Other, "fsync failed"));
        }
        Ok(())
    }

    fn set_len(&self, len: u64) -> io::Result<()> {
        let mut state = self.0.lock();
        if state.fail_set_len {
            return Err(io::Error::new(io::ErrorKind::Other, "truncate failed"));
        }
        state.data.truncate(len as usize);
        Ok(())
    }

    fn len(&self) -> io::Result<u64> {
        Ok(self.0.lock().data.len() as u64)
    }
}

// =============================================================================
// Entry Tests
// =============================================================================

#[test]
fn test_entry_round_trip() {
    let entry = WalEntry::new(
        7,
        vec![
            put("a", "1"),
            BatchOp::Delete {
                key: Bytes::from_static(b"b"),
            },
        ],
    );

    let bytes = entry.serialize().unwrap();
    assert_eq!(&bytes[..8], &7u64.to_be_bytes());

    let recovered = WalEntry::deserialize(&bytes).unwrap();
    assert_eq!(recovered, entry);
}

#[test]
fn test_entry_crc_corruption_detected() {
    let entry = WalEntry::new(1, vec![put("key", "value")]);
    let mut bytes = entry.serialize().unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;

    let err = WalEntry::deserialize(&bytes).unwrap_err();
    assert!(matches!(err, OrdKvError::WalCorruption(_)));
}

#[test]
fn test_entry_lsn_corruption_detected() {
    let entry = WalEntry::new(1, vec![put("key", "value")]);
    let mut bytes = entry.serialize().unwrap();
    bytes[7] = 2;

    assert!(WalEntry::deserialize(&bytes).is_err());
}

#[test]
fn test_entry_truncated() {
    let entry = WalEntry::new(1, vec![put("key", "value")]);
    let bytes = entry.serialize().unwrap();

    assert!(WalEntry::frame_len(&bytes[..HEADER_SIZE - 1]).is_none());
    assert!(WalEntry::frame_len(&bytes[..bytes.len() - 1]).is_none());
    assert_eq!(WalEntry::frame_len(&bytes), Some(bytes.len()));
    assert!(WalEntry::deserialize(&bytes[..bytes.len() - 1]).is_err());
}

// =============================================================================
// Writer Tests
// =============================================================================

#[test]
fn test_writer_assigns_increasing_lsns() {
    let (_temp, path) = setup_temp_wal();
    let mut writer = WalWriter::open(&path, WalSyncStrategy::EveryWrite).unwrap();

    assert_eq!(writer.current_lsn(), 0);
    assert_eq!(writer.append(vec![put("a", "1")]).unwrap(), 1);
    assert_eq!(writer.append(vec![put("b", "2")]).unwrap(), 2);
    assert_eq!(writer.current_lsn(), 2);
    assert_eq!(writer.offset(), fs::metadata(&path).unwrap().len());
}

#[test]
fn test_writer_reopen_continues_lsn() {
    let (_temp, path) = setup_temp_wal();
    write_batches(&path, 3);

    let mut writer = WalWriter::open(&path, WalSyncStrategy::EveryWrite).unwrap();
    assert_eq!(writer.current_lsn(), 3);
    assert_eq!(writer.append(vec![put("z", "z")]).unwrap(), 4);
}

#[test]
fn test_writer_rejects_zero_sync_count() {
    let (_temp, path) = setup_temp_wal();
    let result = WalWriter::open(&path, WalSyncStrategy::EveryNEntries { count: 0 });
    assert!(matches!(result, Err(OrdKvError::Config(_))));
}

#[test]
fn test_writer_every_n_entries() {
    let (_temp, path) = setup_temp_wal();
    let mut writer =
        WalWriter::open(&path, WalSyncStrategy::EveryNEntries { count: 2 }).unwrap();
    for i in 0..5 {
        writer.append(vec![put(&i.to_string(), "v")]).unwrap();
    }
    writer.sync().unwrap();

    let entries: Vec<_> = WalReader::open(&path)
        .unwrap()
        .entries()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(entries.len(), 5);
}

// =============================================================================
// Failed Append Tests
// =============================================================================

#[test]
fn test_failed_sync_rolls_entry_back() {
    let file = FaultyFile::default();
    let mut writer = WalWriter::from_file(file.clone(), WalSyncStrategy::EveryWrite, 0).unwrap();
    writer.append(vec![put("a", "1")]).unwrap();
    let committed = file.bytes();

    file.set(|s| s.fail_sync = true);
    assert!(writer.append(vec![put("b", "2")]).is_err());

    // Log and writer both look as if the append never happened
    assert_eq!(file.bytes(), committed);
    assert_eq!(writer.current_lsn(), 1);
    assert_eq!(writer.offset(), committed.len() as u64);
    assert!(!writer.is_poisoned());

    file.set(|s| s.fail_sync = false);
    assert_eq!(writer.append(vec![put("c", "3")]).unwrap(), 2);
    let lsns: Vec<u64> = file.replayed().iter().map(|e| e.lsn).collect();
    assert_eq!(lsns, vec![1, 2]);
    assert_eq!(file.replayed()[1].ops, vec![put("c", "3")]);
}

#[test]
fn test_partial_write_rolled_back() {
    let file = FaultyFile::default();
    let mut writer = WalWriter::from_file(file.clone(), WalSyncStrategy::EveryWrite, 0).unwrap();
    writer.append(vec![put("a", "1")]).unwrap();
    let committed = file.bytes();

    file.set(|s| s.fail_write = true);
    assert!(writer.append(vec![put("b", "2")]).is_err());
    assert_eq!(file.bytes(), committed);

    file.set(|s| s.broken = false);
    assert_eq!(writer.append(vec![put("c", "3")]).unwrap(), 2);
    assert_eq!(file.replayed().len(), 2);
}

#[test]
fn test_unrecoverable_write_poisons_writer() {
    let file = FaultyFile::default();
    let mut writer = WalWriter::from_file(file.clone(), WalSyncStrategy::EveryWrite, 0).unwrap();
    writer.append(vec![put("a", "1")]).unwrap();

    file.set(|s| {
        s.fail_write = true;
        s.fail_set_len = true;
    });
    assert!(writer.append(vec![put("b", "2")]).is_err());
    assert!(writer.is_poisoned());

    // Even with the device healthy again nothing lands past the torn frame
    file.set(|s| s.broken = false);
    let torn = file.bytes();
    let err = writer.append(vec![put("c", "3")]).unwrap_err();
    assert!(matches!(err, OrdKvError::WalCorruption(_)));
    assert_eq!(file.bytes(), torn);
    assert_eq!(file.replayed().len(), 1);
}

#[test]
fn test_every_n_entries_syncs_on_schedule() {
    let file = FaultyFile::default();
    let mut writer =
        WalWriter::from_file(file.clone(), WalSyncStrategy::EveryNEntries { count: 3 }, 0).unwrap();
    file.set(|s| s.fail_sync = true);

    // First two appends are not due for a sync
    writer.append(vec![put("a", "1")]).unwrap();
    writer.append(vec![put("b", "2")]).unwrap();
    assert!(writer.append(vec![put("c", "3")]).is_err());
    assert_eq!(file.replayed().len(), 2);
    assert_eq!(writer.current_lsn(), 2);
}

// =============================================================================
// Reader Tests
// =============================================================================

#[test]
fn test_reader_stops_at_partial_entry() {
    let first = WalEntry::new(1, vec![put("a", "1")]).serialize().unwrap();
    let second = WalEntry::new(2, vec![put("b", "2")]).serialize().unwrap();
    let mut data = first.clone();
    data.extend_from_slice(&second[..HEADER_SIZE + 1]);

    let mut reader = WalReader::from_bytes(data);
    assert_eq!(reader.next_entry().unwrap().unwrap().lsn, 1);
    assert!(reader.next_entry().is_err());
    assert_eq!(reader.position(), first.len() as u64);
}

// =============================================================================
// Recovery Tests
// =============================================================================

#[test]
fn test_recover_empty_file() {
    let (_temp, path) = setup_temp_wal();
    File::create(&path).unwrap();

    let (entries, result) = WalRecovery::recover(&path).unwrap();
    assert!(entries.is_empty());
    assert_eq!(result.entries_recovered, 0);
    assert_eq!(result.last_lsn, 0);
    assert!(!result.was_truncated);
}

#[test]
fn test_recover_clean_log() {
    let (_temp, path) = setup_temp_wal();
    write_batches(&path, 10);

    let (entries, result) = WalRecovery::recover(&path).unwrap();
    assert_eq!(entries.len(), 10);
    assert_eq!(result.entries_recovered, 10);
    assert_eq!(result.entries_corrupted, 0);
    assert_eq!(result.last_lsn, 10);
    assert!(!result.was_truncated);
    for (i, entry) in entries.iter().enumerate() {
        assert_eq!(entry.lsn, (i + 1) as u64);
    }
}

#[test]
fn test_recover_truncates_torn_tail() {
    let (_temp, path) = setup_temp_wal();
    write_batches(&path, 3);
    let clean_len = fs::metadata(&path).unwrap().len();

    // Half of a fourth entry
    let partial = WalEntry::new(4, vec![put("torn", "torn")]).serialize().unwrap();
    let mut file = OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(&partial[..partial.len() / 2]).unwrap();
    drop(file);

    let (entries, result) = WalRecovery::recover(&path).unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(result.entries_corrupted, 1);
    assert!(result.was_truncated);
    assert_eq!(fs::metadata(&path).unwrap().len(), clean_len);
}

#[test]
fn test_recover_stops_at_corrupted_entry() {
    let (_temp, path) = setup_temp_wal();
    write_batches(&path, 3);

    let mut data = fs::read(&path).unwrap();
    let last = data.len() - 1;
    data[last] ^= 0x55;
    fs::write(&path, &data).unwrap();

    let (entries, result) = WalRecovery::recover(&path).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(result.last_lsn, 2);
    assert!(result.was_truncated);
}

#[test]
fn test_corruption_mid_log_drops_everything_after() {
    let (_temp, path) = setup_temp_wal();
    write_batches(&path, 4);
    let first_len = WalEntry::frame_len(&fs::read(&path).unwrap()).unwrap();

    let mut data = fs::read(&path).unwrap();
    data[first_len + HEADER_SIZE] ^= 0xFF;
    fs::write(&path, &data).unwrap();

    let (entries, result) = WalRecovery::recover(&path).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(result.valid_len, first_len as u64);
    assert_eq!(result.dropped_bytes, (data.len() - first_len) as u64);
    assert_eq!(fs::metadata(&path).unwrap().len(), first_len as u64);
}

#[test]
fn test_verify_does_not_modify() {
    let (_temp, path) = setup_temp_wal();
    write_batches(&path, 2);
    let mut file = OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(&[1, 2, 3]).unwrap();
    drop(file);
    let len = fs::metadata(&path).unwrap().len();

    let result = WalRecovery::verify(&path).unwrap();
    assert_eq!(result.entries_recovered, 2);
    assert_eq!(result.entries_corrupted, 1);
    assert!(result.valid_len < len);
    assert_eq!(fs::metadata(&path).unwrap().len(), len);
}
