use super::{process_line, ProcessedLine};
use crate::indel::IndelConverter;
use crate::types::RecordFormat;
use anyhow::{anyhow, Result};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::thread;

/// (position in batch, 1-based line number, line)
type Job = (usize, u64, Vec<u8>);

/// Fixed set of converter threads fed one batch at a time. Results are
/// put back in input order before they are returned.
pub struct WorkerPool {
    handles: Vec<thread::JoinHandle<()>>,
    tx: Sender<Job>,
    results: Receiver<(usize, ProcessedLine)>,
}

impl WorkerPool {
    pub fn new(converter: &IndelConverter, format: RecordFormat, num_threads: usize, batch_size: usize) -> Self {
        // Both channels hold a full batch, so sending never blocks on
        // results that have not been collected yet.
        let (tx, rx) = bounded::<Job>(batch_size);
        let (result_tx, results) = bounded(batch_size);
        let mut handles = Vec::with_capacity(num_threads);

        for _ in 0..num_threads {
            let rx = rx.clone();
            let result_tx = result_tx.clone();
            let worker_converter = converter.clone();
            let handle = thread::spawn(move || {
                while let Ok((slot, line_no, line)) = rx.recv() {
                    let processed = process_line(&worker_converter, format, line_no, &line);
                    if result_tx.send((slot, processed)).is_err() {
                        break;
                    }
                }
            });
            handles.push(handle);
        }

        WorkerPool {
            handles,
            tx,
            results,
        }
    }

    pub fn process_batch(&self, batch: Vec<(u64, Vec<u8>)>) -> Result<Vec<ProcessedLine>> {
        let len = batch.len();
        for (slot, (line_no, line)) in batch.into_iter().enumerate() {
            self.tx
                .send((slot, line_no, line))
                .map_err(|_| anyhow!("All conversion workers have stopped"))?;
        }

        let mut ordered: Vec<Option<ProcessedLine>> = vec![None; len];
        for _ in 0..len {
            let (slot, processed) = self
                .results
                .recv()
                .map_err(|_| anyhow!("All conversion workers have stopped"))?;
            ordered[slot] = Some(processed);
        }
        ordered
            .into_iter()
            .map(|p| p.ok_or_else(|| anyhow!("Missing result from conversion worker")))
            .collect()
    }

    pub fn finish(self) -> Result<()> {
        drop(self.tx);
        for handle in self.handles {
            handle
                .join()
                .map_err(|_| anyhow!("Conversion worker panicked"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Unavailable;
    use crate::processor::LineKind;
    use crate::reference::NucleotideSource;
    use crate::types::Notation;
    use std::sync::mpsc;
    use std::sync::Arc;
    use std::time::Duration;

    struct PanickingSource;

    impl NucleotideSource for PanickingSource {
        fn fetch(&self, contig: &str, start: u64, _end: u64) -> Result<String, Unavailable> {
            panic!("lookup of {}:{} blew up", contig, start)
        }

        fn describe(&self) -> String {
            "panicking source".to_string()
        }
    }

    #[test]
    fn panicking_record_does_not_stall_the_pool() {
        let converter = IndelConverter::new(Arc::new(PanickingSource), Notation::NoDash);
        let batch: Vec<(u64, Vec<u8>)> = vec![
            (1, b"chr1\t4\t4\t-\tGG".to_vec()),
            (2, b"chr1\t5\t5\tA\tG".to_vec()),
            (3, b"chr1\t6\t6\tA\t-".to_vec()),
        ];
        let expected: Vec<Vec<u8>> = batch.iter().map(|(_, line)| line.clone()).collect();

        let (done_tx, done_rx) = mpsc::channel();
        thread::spawn(move || {
            let pool = WorkerPool::new(&converter, RecordFormat::Txt, 2, 8);
            let first = pool.process_batch(batch);
            let second = pool.process_batch(vec![(4, b"chr1\t7\t7\t-\tT".to_vec())]);
            let finished = pool.finish();
            let _ = done_tx.send((first, second, finished.is_ok()));
        });

        let (first, second, finished) = done_rx
            .recv_timeout(Duration::from_secs(10))
            .expect("worker pool hung after a panic");
        let first = first.unwrap();
        assert_eq!(
            first.iter().map(|p| p.bytes.clone()).collect::<Vec<_>>(),
            expected
        );
        assert_eq!(
            first.iter().map(|p| p.kind).collect::<Vec<_>>(),
            vec![LineKind::Failed, LineKind::Unchanged, LineKind::Failed]
        );
        assert_eq!(second.unwrap()[0].kind, LineKind::Failed);
        assert!(finished);
    }
}
