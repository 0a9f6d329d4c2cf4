//! End-to-end scan/print workflow test
//!
//! Drives the full loop against a recording transport: build a consignment,
//! composite the merged document, then scan, fail, retry, reprint, and
//! verify the printed set round-trips through storage.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use carton_printer::{PrintError, PrintResult, PrintTransport};
use carton_server::boxes;
use carton_server::labels::pdf::{DocumentBuilder, Font, PageCanvas};
use carton_server::labels::{LabelDocumentStore, composite};
use carton_server::printing::{PrintServiceError, ScanPrintService, ScanResult};
use carton_server::storage::ConsignmentStorage;
use shared::models::{Address, Channel, Consignment, LineItem};

/// Transport double: records submissions, fails on demand
#[derive(Default)]
struct RecordingTransport {
    fail: AtomicBool,
    submissions: Mutex<Vec<(String, usize)>>,
}

impl RecordingTransport {
    fn submission_count(&self) -> usize {
        self.submissions.lock().unwrap().len()
    }

    fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl PrintTransport for RecordingTransport {
    async fn submit(&self, page: &[u8], target: &str) -> PrintResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PrintError::Spooler("printer unplugged".to_string()));
        }
        self.submissions
            .lock()
            .unwrap()
            .push((target.to_string(), page.len()));
        Ok(())
    }

    async fn is_available(&self) -> bool {
        true
    }
}

fn line_item(sku: &str, qty: u32, ppcn: f64) -> LineItem {
    LineItem {
        sku_id: sku.to_string(),
        product_name: format!("Product {}", sku),
        editable_qty: qty,
        units_per_carton: ppcn,
        editable_boxes: qty as f64 / ppcn,
        fsn: Some(format!("FSN-{}", sku)),
        ean: Some(format!("890{}", sku)),
    }
}

fn consignment() -> Consignment {
    Consignment {
        id: "CON-2025-001".to_string(),
        date: chrono::NaiveDate::from_ymd_opt(2025, 11, 3).unwrap(),
        channel: Channel::Flipkart,
        // A expands to boxes 1-4 (qty 5 each), B to boxes 5-7 (qty 3 each)
        line_items: vec![line_item("A", 20, 5.0), line_item("B", 9, 3.0)],
        original_csv: "SKU Id,Quantity Sent\nA,20\nB,9\n".to_string(),
        sender: Address::default(),
        receiver: Address::default(),
        printed_boxes: Default::default(),
        created_at: 1,
    }
}

fn carrier_pdf(pages: usize) -> Vec<u8> {
    let mut builder = DocumentBuilder::new();
    for i in 0..pages {
        let mut canvas = PageCanvas::new();
        canvas.text(Font::Regular, 14.0, 40.0, 120.0, &format!("AWB {}", i + 1));
        builder.add_page(canvas).unwrap();
    }
    builder.finish().unwrap()
}

struct Harness {
    _dir: tempfile::TempDir,
    storage: ConsignmentStorage,
    service: ScanPrintService,
    transport: Arc<RecordingTransport>,
}

fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let storage = ConsignmentStorage::open(dir.path().join("carton.redb")).unwrap();
    let documents = Arc::new(LabelDocumentStore::new(dir.path().join("files")).unwrap());
    let transport = Arc::new(RecordingTransport::default());
    let service = ScanPrintService::new(
        storage.clone(),
        documents.clone(),
        transport.clone() as Arc<dyn PrintTransport>,
    );

    let c = consignment();
    storage.put_consignment(&c).unwrap();

    // Build and persist the merged document the way the carrier-upload
    // handler does.
    let box_list = boxes::expand(&c.line_items);
    let merged = composite(&box_list, &carrier_pdf(4), |_| {}).unwrap();
    documents
        .store_merged(&c.id, &merged, &boxes::table_fingerprint(&c.line_items))
        .unwrap();

    Harness {
        _dir: dir,
        storage,
        service,
        transport,
    }
}

fn printed(h: &Harness) -> Vec<u32> {
    h.storage
        .get_consignment("CON-2025-001")
        .unwrap()
        .unwrap()
        .printed_boxes
        .into_iter()
        .collect()
}

#[tokio::test]
async fn scans_resolve_fifo_and_exactly_once() {
    let h = harness();

    // Scanning B three times walks boxes 5, 6, 7
    for expected in [5u32, 6, 7] {
        let result = h
            .service
            .process_scan("CON-2025-001", "B", "Zebra-1")
            .await
            .unwrap();
        assert_eq!(
            result,
            ScanResult::Printed {
                box_number: expected,
                persisted: true
            }
        );
    }
    assert_eq!(printed(&h), vec![5, 6, 7]);

    // Fourth scan: everything for B is printed
    let result = h
        .service
        .process_scan("CON-2025-001", "B", "Zebra-1")
        .await
        .unwrap();
    assert_eq!(result, ScanResult::AlreadyPrinted);
    assert_eq!(h.transport.submission_count(), 3);
}

#[tokio::test]
async fn alternate_identifiers_resolve_same_boxes() {
    let h = harness();

    // FSN and EAN hit the same product's boxes in order
    let r1 = h
        .service
        .process_scan("CON-2025-001", "FSN-A", "Zebra-1")
        .await
        .unwrap();
    assert_eq!(
        r1,
        ScanResult::Printed {
            box_number: 1,
            persisted: true
        }
    );

    let r2 = h
        .service
        .process_scan("CON-2025-001", "890A", "Zebra-1")
        .await
        .unwrap();
    assert_eq!(
        r2,
        ScanResult::Printed {
            box_number: 2,
            persisted: true
        }
    );
}

#[tokio::test]
async fn transport_failure_leaves_state_retryable() {
    let h = harness();

    h.transport.set_failing(true);
    let err = h
        .service
        .process_scan("CON-2025-001", "A", "Zebra-1")
        .await
        .unwrap_err();
    assert!(matches!(err, PrintServiceError::Transport(_)));
    assert!(printed(&h).is_empty());

    // The identical rescan resolves to the same box and succeeds
    h.transport.set_failing(false);
    let result = h
        .service
        .process_scan("CON-2025-001", "A", "Zebra-1")
        .await
        .unwrap();
    assert_eq!(
        result,
        ScanResult::Printed {
            box_number: 1,
            persisted: true
        }
    );
    assert_eq!(printed(&h), vec![1]);
}

#[tokio::test]
async fn unknown_and_empty_tokens_are_harmless() {
    let h = harness();

    let result = h
        .service
        .process_scan("CON-2025-001", "NOT-A-SKU", "Zebra-1")
        .await
        .unwrap();
    assert_eq!(result, ScanResult::NoMatch);

    let result = h
        .service
        .process_scan("CON-2025-001", "   ", "Zebra-1")
        .await
        .unwrap();
    assert_eq!(result, ScanResult::Ignored);

    assert_eq!(h.transport.submission_count(), 0);
}

#[tokio::test]
async fn reprint_bypasses_printed_set() {
    let h = harness();

    h.service
        .process_scan("CON-2025-001", "B", "Zebra-1")
        .await
        .unwrap();
    assert_eq!(printed(&h), vec![5]);

    // Reprint of an already-printed box succeeds and does not double-count
    h.service
        .reprint("CON-2025-001", 5, "Zebra-1")
        .await
        .unwrap();
    assert_eq!(printed(&h), vec![5]);
    assert_eq!(h.transport.submission_count(), 2);

    // Out-of-range reprint is a clean error
    let err = h
        .service
        .reprint("CON-2025-001", 99, "Zebra-1")
        .await
        .unwrap_err();
    assert!(matches!(err, PrintServiceError::PageOutOfRange(99)));
}

#[tokio::test]
async fn edited_table_makes_document_stale() {
    let h = harness();

    let mut c = h.storage.get_consignment("CON-2025-001").unwrap().unwrap();
    c.line_items[0].editable_qty = 25;
    c.line_items[0].editable_boxes = 5.0;
    h.storage.put_consignment(&c).unwrap();
    h.service.invalidate_session("CON-2025-001");

    let err = h
        .service
        .process_scan("CON-2025-001", "A", "Zebra-1")
        .await
        .unwrap_err();
    assert!(matches!(err, PrintServiceError::DocumentStale));
    assert_eq!(h.transport.submission_count(), 0);
}

#[tokio::test]
async fn printed_boxes_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("carton.redb");

    {
        let storage = ConsignmentStorage::open(&db_path).unwrap();
        let documents =
            Arc::new(LabelDocumentStore::new(dir.path().join("files")).unwrap());
        let transport = Arc::new(RecordingTransport::default());
        let service = ScanPrintService::new(
            storage.clone(),
            documents.clone(),
            transport as Arc<dyn PrintTransport>,
        );

        let c = consignment();
        storage.put_consignment(&c).unwrap();
        let box_list = boxes::expand(&c.line_items);
        let merged = composite(&box_list, &carrier_pdf(4), |_| {}).unwrap();
        documents
            .store_merged(&c.id, &merged, &boxes::table_fingerprint(&c.line_items))
            .unwrap();

        for _ in 0..3 {
            service
                .process_scan("CON-2025-001", "B", "Zebra-1")
                .await
                .unwrap();
        }
    }

    // Fresh process: the printed set must be exactly what was dispatched
    let storage = ConsignmentStorage::open(&db_path).unwrap();
    let reloaded = storage.get_consignment("CON-2025-001").unwrap().unwrap();
    let printed: Vec<u32> = reloaded.printed_boxes.into_iter().collect();
    assert_eq!(printed, vec![5, 6, 7]);
}

#[tokio::test]
async fn missing_merged_document_blocks_scanning() {
    let dir = tempfile::tempdir().unwrap();
    let storage = ConsignmentStorage::open(dir.path().join("carton.redb")).unwrap();
    let documents = Arc::new(LabelDocumentStore::new(dir.path().join("files")).unwrap());
    let transport = Arc::new(RecordingTransport::default());
    let service = ScanPrintService::new(
        storage.clone(),
        documents,
        transport as Arc<dyn PrintTransport>,
    );

    storage.put_consignment(&consignment()).unwrap();

    let err = service
        .process_scan("CON-2025-001", "A", "Zebra-1")
        .await
        .unwrap_err();
    assert!(matches!(err, PrintServiceError::MergedDocumentMissing));
}
