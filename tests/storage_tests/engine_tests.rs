//! Tests for PersistenceEngine
//!
//! These tests verify:
//! - Formatting, idempotent re-initialization and reformat on mismatch
//! - Header validation and corruption detection
//! - Freshest-generation scan, including wrap of the generation counter
//! - Wear leveling across many saves
//! - Save/load round trips and their failure modes

use ringstore::storage::{EngineState, PersistenceEngine, RingLayout, BEGIN_MARKER, END_MARKER};
use ringstore::{Device, MemoryDevice, Record, StoreError, WorkingTable};

// =============================================================================
// Helper Functions
// =============================================================================

const DEVICE_SIZE: usize = 2048;

fn setup_engine(capacity: usize) -> PersistenceEngine<u32, MemoryDevice> {
    let mut engine = PersistenceEngine::new(MemoryDevice::new(DEVICE_SIZE));
    engine.init(0, capacity).unwrap();
    engine
}

fn table_with(capacity: usize, records: &[u32]) -> WorkingTable<u32> {
    let mut table = WorkingTable::new();
    table.init(capacity).unwrap();
    for record in records {
        table.insert(*record).unwrap();
    }
    table
}

fn loaded(engine: &mut PersistenceEngine<u32, MemoryDevice>, capacity: usize) -> Vec<u32> {
    let mut table = table_with(capacity, &[]);
    engine.load(&mut table).unwrap();
    table.iter().copied().collect()
}

// =============================================================================
// Init / Format Tests
// =============================================================================

#[test]
fn test_init_formats_blank_device() {
    let engine = setup_engine(4);
    let bytes = engine.device().as_bytes();

    assert_eq!(bytes[0], BEGIN_MARKER);
    assert_eq!(bytes[1], 4);
    assert_eq!(&bytes[2..6], &[0, 0, 0, 0]);
    assert_eq!(bytes[6], END_MARKER);
    assert_eq!(engine.state(), EngineState::Ready);
}

#[test]
fn test_init_formats_erased_device() {
    let mut engine: PersistenceEngine<u32, _> =
        PersistenceEngine::new(MemoryDevice::filled(DEVICE_SIZE, 0xFF));
    engine.init(10, 3).unwrap();

    let layout = *engine.layout().unwrap();
    let bytes = engine.device().as_bytes();

    assert_eq!(bytes[9], 0xFF);
    assert_eq!(bytes[10], BEGIN_MARKER);
    assert!(bytes[12..layout.end_marker_address()].iter().all(|&b| b == 0));
    assert!(bytes[layout.data_base()..layout.region_end()].iter().all(|&b| b == 0));
    assert_eq!(bytes[layout.region_end()], 0xFF);
}

#[test]
fn test_fresh_region_top_is_first_slot() {
    let engine = setup_engine(4);
    let layout = *engine.layout().unwrap();

    assert_eq!(engine.top_address(), Some(layout.data_base()));
    assert_eq!(engine.next_free_address(), Some(layout.region_end()));
}

#[test]
fn test_capacity_bounds() {
    let mut engine: PersistenceEngine<u32, _> = PersistenceEngine::new(MemoryDevice::new(DEVICE_SIZE));

    assert!(matches!(engine.init(0, 0), Err(StoreError::CapacityExceeded(_))));
    assert!(matches!(engine.init(0, 256), Err(StoreError::CapacityExceeded(_))));

    // 255 * 5 + 255 + 4 = 1534 bytes fit in 2048
    engine.init(0, 255).unwrap();
    assert_eq!(engine.next_free_address(), Some(1534));
}

#[test]
fn test_region_past_device_end_fails() {
    let mut engine: PersistenceEngine<u32, _> = PersistenceEngine::new(MemoryDevice::new(64));

    let result = engine.init(40, 4);

    assert!(matches!(result, Err(StoreError::OutOfRange(_))));
    assert_ne!(engine.state(), EngineState::Ready);
    // Geometry is still reported
    assert_eq!(engine.next_free_address(), Some(40 + 4 + 4 + 4 * 5));
}

#[test]
fn test_region_ending_exactly_at_device_end() {
    let layout = RingLayout::new(0, 4, u32::slot_size()).unwrap();
    let mut engine: PersistenceEngine<u32, _> =
        PersistenceEngine::new(MemoryDevice::new(layout.region_end()));

    engine.init(0, 4).unwrap();
}

#[test]
fn test_next_free_address_before_init() {
    let engine: PersistenceEngine<u32, _> = PersistenceEngine::new(MemoryDevice::new(16));

    assert_eq!(engine.next_free_address(), None);
    assert_eq!(engine.top_address(), None);
}

#[test]
fn test_reinit_with_same_config_keeps_data() {
    let mut engine = setup_engine(4);
    engine.save(&table_with(4, &[1, 2, 3])).unwrap();
    let before = engine.checksum().unwrap();

    engine.init(0, 4).unwrap();

    assert_eq!(engine.checksum().unwrap(), before);
    assert_eq!(loaded(&mut engine, 4), vec![1, 2, 3]);
}

#[test]
fn test_reinit_with_other_capacity_reformats() {
    let mut engine = setup_engine(4);
    engine.save(&table_with(4, &[1, 2, 3])).unwrap();

    engine.init(0, 3).unwrap();

    assert_eq!(engine.device().as_bytes()[1], 3);
    assert!(loaded(&mut engine, 4).is_empty());
}

// =============================================================================
// Check Tests
// =============================================================================

#[test]
fn test_check_before_init_fails() {
    let mut engine: PersistenceEngine<u32, _> = PersistenceEngine::new(MemoryDevice::new(64));

    assert!(matches!(engine.check(), Err(StoreError::NotInitialized(_))));
}

#[test]
fn test_check_detects_damaged_markers() {
    let mut engine = setup_engine(4);
    let layout = *engine.layout().unwrap();

    engine
        .device_mut()
        .write_byte(layout.end_marker_address(), 0x00)
        .unwrap();

    assert!(matches!(engine.check(), Err(StoreError::Corrupt(_))));
    assert_eq!(engine.state(), EngineState::Unformatted);
    assert_eq!(engine.top_address(), None);

    let table = table_with(4, &[1]);
    assert!(matches!(engine.save(&table), Err(StoreError::NotInitialized(_))));
}

#[test]
fn test_check_detects_capacity_mismatch() {
    let mut engine = setup_engine(4);

    engine.device_mut().write_byte(1, 5).unwrap();

    assert!(matches!(engine.check(), Err(StoreError::Corrupt(_))));
}

#[test]
fn test_init_repairs_damaged_region() {
    let mut engine = setup_engine(4);
    engine.device_mut().write_byte(0, 0x00).unwrap();
    assert!(engine.check().is_err());

    engine.init(0, 4).unwrap();

    assert_eq!(engine.state(), EngineState::Ready);
}

// =============================================================================
// Freshest-Generation Scan Tests
// =============================================================================

#[test]
fn test_scan_on_all_equal_ring_terminates() {
    let mut engine = setup_engine(5);
    engine.device_mut().fill(2, 5, 7).unwrap();

    engine.check().unwrap();

    assert_eq!(engine.inspect().unwrap().top_index, 0);
}

#[test]
fn test_scan_on_fully_increasing_ring_terminates() {
    let mut engine = setup_engine(3);
    engine.device_mut().write_bytes(2, &[1, 2, 3]).unwrap();

    engine.check().unwrap();

    assert_eq!(engine.inspect().unwrap().top_index, 2);
}

#[test]
fn test_scan_follows_wrapping_values() {
    let mut engine = setup_engine(4);
    engine.device_mut().write_bytes(2, &[254, 255, 0, 250]).unwrap();

    engine.check().unwrap();

    assert_eq!(engine.inspect().unwrap().top_index, 2);
}

#[test]
fn test_top_follows_save_count() {
    let mut engine = setup_engine(3);
    let table = table_with(3, &[9]);

    for saves in 1..=300usize {
        engine.save(&table).unwrap();
        assert_eq!(engine.inspect().unwrap().top_index, saves % 3);
    }

    // Generation counters wrapped past 255 along the way
    assert_eq!(engine.inspect().unwrap().ring, vec![44, 42, 43]);
    assert_eq!(loaded(&mut engine, 3), vec![9]);
}

// =============================================================================
// Wear Leveling Tests
// =============================================================================

#[test]
fn test_each_ring_byte_written_once_per_cycle() {
    let capacity = 4;
    let mut engine = setup_engine(capacity);
    let layout = *engine.layout().unwrap();
    let table = table_with(4, &[1, 2]);
    engine.device_mut().reset_write_counts();

    for cycle in 1..=3u32 {
        for _ in 0..capacity {
            engine.save(&table).unwrap();
        }
        for position in layout.positions() {
            assert_eq!(engine.device().write_count(position), cycle);
        }
    }
}

#[test]
fn test_no_ring_byte_written_twice_in_one_pass() {
    let mut engine = setup_engine(5);
    let layout = *engine.layout().unwrap();
    let table = table_with(5, &[1]);
    engine.device_mut().reset_write_counts();

    for saves in 1..=5 {
        engine.save(&table).unwrap();
        let written = layout
            .positions()
            .filter(|&position| engine.device().write_count(position) == 1)
            .count();
        assert_eq!(written, saves);
        assert!(layout
            .positions()
            .all(|position| engine.device().write_count(position) <= 1));
    }
}

// =============================================================================
// Save Tests
// =============================================================================

#[test]
fn test_save_before_init_fails() {
    let mut engine: PersistenceEngine<u32, _> = PersistenceEngine::new(MemoryDevice::new(64));

    let result = engine.save(&table_with(2, &[1]));

    assert!(matches!(result, Err(StoreError::NotInitialized(_))));
}

#[test]
fn test_first_save_layout() {
    let mut engine = setup_engine(3);
    let layout = *engine.layout().unwrap();

    engine.save(&table_with(3, &[0xAABB_CCDD])).unwrap();

    let top = layout.data_address(layout.first_position() + 1);
    let bytes = engine.device().as_bytes();

    assert_eq!(&bytes[2..5], &[0, 1, 0]);
    assert_eq!(engine.top_address(), Some(top));
    assert_eq!(&bytes[top..top + 5], &[0xDD, 0xCC, 0xBB, 0xAA, 1]);
    assert_eq!(bytes[top - 1], 1);
}

#[test]
fn test_save_skips_tombstones() {
    let mut engine = setup_engine(4);
    let mut table = table_with(4, &[1, 2, 3]);
    table.top();
    table.delete().unwrap();

    engine.save(&table).unwrap();

    assert_eq!(engine.inspect().unwrap().persisted_count, 2);
    assert_eq!(loaded(&mut engine, 4), vec![2, 3]);
}

#[test]
fn test_save_more_records_than_ring_fails_without_writing() {
    let mut engine = setup_engine(2);
    let before = engine.checksum().unwrap();

    let result = engine.save(&table_with(4, &[1, 2, 3]));

    assert!(matches!(result, Err(StoreError::CapacityExceeded(_))));
    assert_eq!(engine.checksum().unwrap(), before);
}

#[test]
fn test_save_empty_table() {
    let mut engine = setup_engine(3);
    engine.save(&table_with(3, &[4, 5])).unwrap();

    engine.save(&table_with(3, &[])).unwrap();

    assert_eq!(engine.inspect().unwrap().persisted_count, 0);
    assert!(loaded(&mut engine, 3).is_empty());
}

// =============================================================================
// Load Tests
// =============================================================================

#[test]
fn test_round_trip_preserves_order() {
    let mut engine = setup_engine(5);
    let mut table = table_with(5, &[10, 20, 30, 40]);
    table.top();
    table.next();
    table.delete().unwrap();

    engine.save(&table).unwrap();
    table.clean();
    engine.load(&mut table).unwrap();

    assert_eq!(table.counter(), 3);
    assert!(table.top());
    assert_eq!(table.select(), Some(&10));
    assert!(table.next());
    assert_eq!(table.select(), Some(&30));
    assert!(table.next());
    assert_eq!(table.select(), Some(&40));
    assert!(!table.next());
}

#[test]
fn test_round_trip_with_full_ring() {
    let mut engine = setup_engine(3);

    // Three saves so generations wrap into every slot
    for round in 0..3u32 {
        engine
            .save(&table_with(3, &[round, round + 10, round + 20]))
            .unwrap();
    }

    assert_eq!(loaded(&mut engine, 3), vec![2, 12, 22]);
}

#[test]
fn test_load_returns_latest_generation() {
    let mut engine = setup_engine(4);

    engine.save(&table_with(4, &[1, 2, 3])).unwrap();
    engine.save(&table_with(4, &[7])).unwrap();

    assert_eq!(loaded(&mut engine, 4), vec![7]);
}

#[test]
fn test_load_replaces_table_contents() {
    let mut engine = setup_engine(4);
    engine.save(&table_with(4, &[1])).unwrap();

    let mut table = table_with(4, &[5, 6, 7]);
    engine.load(&mut table).unwrap();

    assert_eq!(table.iter().copied().collect::<Vec<_>>(), vec![1]);
    assert_eq!(table.counter(), 1);
    assert_eq!(table.select(), Some(&1));
}

#[test]
fn test_load_into_smaller_table_fails() {
    let mut engine = setup_engine(4);
    engine.save(&table_with(4, &[1, 2, 3])).unwrap();

    let mut table = table_with(2, &[]);
    let result = engine.load(&mut table);

    assert!(matches!(result, Err(StoreError::CapacityExceeded(_))));
}

#[test]
fn test_load_rejects_impossible_count() {
    let mut engine = setup_engine(3);
    let layout = *engine.layout().unwrap();
    engine
        .device_mut()
        .write_byte(layout.data_base() - 1, 9)
        .unwrap();

    let mut table = table_with(10, &[]);
    let result = engine.load(&mut table);

    assert!(matches!(result, Err(StoreError::Corrupt(_))));
}

#[test]
fn test_load_before_init_fails() {
    let mut engine: PersistenceEngine<u32, _> = PersistenceEngine::new(MemoryDevice::new(64));
    let mut table = table_with(2, &[]);

    assert!(matches!(engine.load(&mut table), Err(StoreError::NotInitialized(_))));
}

// =============================================================================
// Borrowed Device Tests
// =============================================================================

#[test]
fn test_engine_over_borrowed_device() {
    let mut device = MemoryDevice::new(256);

    {
        let mut engine: PersistenceEngine<u32, _> = PersistenceEngine::new(&mut device);
        engine.init(0, 4).unwrap();
        engine.save(&table_with(4, &[3, 1, 4])).unwrap();
    }

    // Power cycle: a fresh engine over the same bytes
    let mut engine: PersistenceEngine<u32, _> = PersistenceEngine::new(&mut device);
    engine.init(0, 4).unwrap();
    let mut table = table_with(4, &[]);
    engine.load(&mut table).unwrap();

    assert_eq!(table.iter().copied().collect::<Vec<_>>(), vec![3, 1, 4]);
}
