//! Preprocessing Integration Tests
//!
//! Builds preprocessors from code and from YAML, then feeds the padded id
//! sequences through embedding lookup into the trainer.

use std::io::Write;

use approx::assert_relative_eq;
use ensayo::config::HarnessSpec;
use ensayo::preprocessing::{Preprocessor, Uniform, Vocabulary, PAD_ID};
use ensayo::train::{Inputs, Trainer};
use ensayo::Error;
use ndarray::{Array2, ArrayD, Axis};
use tempfile::TempDir;

const CORPUS: [&str; 4] = [
    "The cat sat on the mat",
    "the dog sat on the log",
    "A cat and a dog",
    "Nothing sat",
];

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

/// Mean embedding of the non-padding ids of each row
fn bag_of_embeddings(ids: &[Vec<i64>], embeddings: &Array2<f32>) -> ArrayD<f32> {
    let mut features = Array2::<f32>::zeros((ids.len(), embeddings.ncols()));
    for (mut row, sequence) in features.axis_iter_mut(Axis(0)).zip(ids) {
        let tokens: Vec<usize> =
            sequence.iter().filter(|&&id| id != PAD_ID).map(|&id| id as usize).collect();
        for &id in &tokens {
            row += &embeddings.row(id);
        }
        if !tokens.is_empty() {
            row /= tokens.len() as f32;
        }
    }
    features.into_dyn()
}

#[test]
fn test_corpus_round_trip() {
    let mut pre = Preprocessor::builder()
        .embed_size(8)
        .initializer(Uniform::seeded(0.1, 3).unwrap())
        .build()
        .unwrap();
    let ids = pre.fit_transform(&CORPUS, Some(8)).unwrap();

    assert_eq!(ids.len(), CORPUS.len());
    assert!(ids.iter().all(|row| row.len() == 8));
    assert_eq!(ids[0][0], ids[0][4], "'The' and 'the' share an id");
    assert_eq!(&ids[3][2..], &[PAD_ID; 6]);

    let vocab = pre.vocabulary();
    for (row, doc) in ids.iter().zip(CORPUS) {
        for (id, token) in row.iter().zip(doc.split_whitespace()) {
            assert_eq!(vocab.lookup(*id as u32).unwrap(), token.to_lowercase());
        }
    }

    let rows = pre.vocabulary().len();
    let embeddings = pre.get_embeddings();
    assert_eq!(embeddings.shape(), &[rows, 8]);
    assert!(embeddings.iter().all(|v| v.abs() <= 0.1));
}

#[test]
fn test_unseen_text_after_fit() {
    let mut pre = Preprocessor::new(4).unwrap();
    pre.fit(CORPUS).unwrap();
    let vocab_before: Vocabulary = pre.vocabulary().clone();

    let ids = pre.transform(["the zebra sat", "zebra zebra"], Some(3)).unwrap();
    let unk = i64::from(pre.unknown_id());
    assert_eq!(ids[1], vec![unk, unk, PAD_ID]);
    assert_eq!(ids[0][1], unk);
    assert_eq!(pre.vocabulary(), &vocab_before);

    let err = pre.transform(["one two three four"], Some(3)).unwrap_err();
    assert!(matches!(err, Error::SequenceTooLong { length: 4, limit: 3 }));
}

#[test]
fn test_streaming_fit_matches_batch_fit() {
    let mut streamed = Preprocessor::new(2).unwrap();
    for doc in CORPUS {
        streamed.fit_one(doc).unwrap();
    }
    let mut batched = Preprocessor::new(2).unwrap();
    batched.fit(CORPUS).unwrap();
    assert_eq!(streamed.vocabulary(), batched.vocabulary());
}

#[test]
fn test_yaml_preprocessor_with_embedding_files() {
    let dir = TempDir::new().unwrap();
    let vectors = write(&dir, "vectors.txt", "0.1 0.2 0.3\n0.4 0.5 0.6\n0.7 0.8 0.9\n");
    let words = write(&dir, "words.txt", "cat\ndog\n<num>\n");
    let yaml = format!(
        "preprocessor:\n  embed_file: {}\n  vocab_file: {}\n  unknown: <num>\n  replace_numbers: \"true\"\n",
        vectors.display(),
        words.display()
    );
    let spec = HarnessSpec::from_yaml_str(&yaml).unwrap();
    let config = spec.preprocessor.unwrap();
    assert!(config.replace_numbers);

    let mut pre = Preprocessor::from_config(&config).unwrap();
    assert_eq!(pre.embed_size(), 3);
    assert_eq!(pre.unknown_id(), 2);

    let ids = pre.transform_one("Dog 42 cat", None).unwrap();
    assert_eq!(ids[0], 1);
    assert_eq!(ids[2], 0);

    pre.fit(["bird"]).unwrap();
    let embeddings = pre.get_embeddings();
    assert_eq!(embeddings.nrows(), 4);
    assert_relative_eq!(embeddings[[1, 2]], 0.6);
}

#[test]
fn test_yaml_rejects_vocab_without_embeddings() {
    let err = HarnessSpec::from_yaml_str("preprocessor:\n  vocab_file: words.txt\n").unwrap_err();
    assert!(err.to_string().contains("Invalid config"));
}

#[test]
fn test_padded_ids_feed_the_trainer() {
    let mut pre = Preprocessor::builder()
        .embed_size(4)
        .initializer(Uniform::seeded(1.0, 5).unwrap())
        .build()
        .unwrap();
    let ids = pre.fit_transform(&CORPUS, Some(6)).unwrap();
    let features = bag_of_embeddings(&ids, pre.get_embeddings());
    assert_eq!(features.shape(), &[4, 4]);

    let targets = ArrayD::from_shape_vec(vec![4], vec![1.0, 1.0, 0.0, 0.0]).unwrap();
    let model = |xs: &Inputs| -> ArrayD<f32> { xs.columns()[0].sum_axis(Axis(1)) };
    let loss = |ys: &ArrayD<f32>, ts: &ArrayD<f32>| -> f32 { (ys - ts).mapv(|d| d * d).mean().unwrap_or(0.0) };
    let mut trainer = Trainer::with_update((), model, loss, |_: &mut (), _: &f32| {});

    let options = ensayo::config::FitOptions::default().with_batch_size(4).with_epochs(2).with_verbose(false);
    let result = trainer.fit(features, targets, None, &options).unwrap();
    assert_eq!(result.losses.len(), 2);
    assert_relative_eq!(result.losses[0].training, result.losses[1].training, epsilon = 1e-5);
}
