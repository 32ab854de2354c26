//! ARN and physical name construction.

use crate::region::{Partition, StackEnv};

use sha2::{Digest, Sha256};

/// Maximum length of a bucket name.
pub const MAX_BUCKET_NAME_LEN: usize = 63;

/// Maximum length of a function name.
pub const MAX_FUNCTION_NAME_LEN: usize = 64;

/// `arn:{partition}:s3:::{bucket}`
#[must_use]
pub fn bucket_arn(partition: Partition, bucket_name: &str) -> String {
    format!("arn:{partition}:s3:::{bucket_name}")
}

/// Wildcard covering every object in the bucket: `{bucket_arn}/*`.
#[must_use]
pub fn objects_arn(bucket_arn: &str) -> String {
    format!("{bucket_arn}/*")
}

/// `arn:{partition}:lambda:{region}:{account}:function:{name}`
#[must_use]
pub fn function_arn(env: &StackEnv, function_name: &str) -> String {
    format!(
        "arn:{}:lambda:{}:{}:function:{function_name}",
        env.partition(),
        env.region(),
        env.account()
    )
}

/// `arn:{partition}:iam::aws:policy/{name}`
#[must_use]
pub fn managed_policy_arn(partition: Partition, name: &str) -> String {
    format!("arn:{partition}:iam::aws:policy/{name}")
}

/// Length of the hash suffix appended to truncated physical names.
const NAME_HASH_LEN: usize = 8;

/// Derives a deterministic physical name for a resource that was not given one.
///
/// Lowercases and replaces characters outside `[a-z0-9.-]` with `-`. The
/// name never starts or ends with `-` or `.`. A name longer than `max_len`
/// keeps its head and tail and gets a hash of `{stack_name}/{logical_id}`,
/// so distinct logical ids never share a truncated name.
#[must_use]
pub fn physical_name(stack_name: &str, logical_id: &str, max_len: usize) -> String {
    let sanitized: Vec<char> = format!("{stack_name}-{logical_id}")
        .chars()
        .map(|c| c.to_ascii_lowercase())
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '-' })
        .collect();

    if sanitized.len() <= max_len {
        return trim_separators(&sanitized.iter().collect::<String>()).to_owned();
    }

    let digest = Sha256::digest(format!("{stack_name}/{logical_id}").as_bytes());
    let mut hash = hex_simd::encode_to_string(digest, hex_simd::AsciiCase::Lower);
    hash.truncate(NAME_HASH_LEN);

    let budget = max_len.saturating_sub(NAME_HASH_LEN + 1);
    let tail = budget / 2;
    let head = budget - tail;
    let human: String = sanitized[..head].iter().chain(&sanitized[sanitized.len() - tail..]).collect();

    let human = trim_separators(&human);
    if human.is_empty() {
        hash
    } else {
        format!("{human}-{hash}")
    }
}

fn trim_separators(name: &str) -> &str {
    name.trim_matches(|c| c == '-' || c == '.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_arns() {
        let arn = bucket_arn(Partition::Aws, "csv-data");
        assert_eq!(arn, "arn:aws:s3:::csv-data");
        assert_eq!(objects_arn(&arn), "arn:aws:s3:::csv-data/*");
        assert_eq!(bucket_arn(Partition::AwsCn, "b"), "arn:aws-cn:s3:::b");
    }

    #[test]
    fn function_arns() {
        let env = StackEnv::new("123456789012", "us-west-2").unwrap();
        assert_eq!(
            function_arn(&env, "processor"),
            "arn:aws:lambda:us-west-2:123456789012:function:processor"
        );
    }

    #[test]
    fn physical_names() {
        assert_eq!(physical_name("CsvConverter", "DataBucket", 63), "csvconverter-databucket");
        assert_eq!(physical_name("My Stack", "Data_Bucket", 63), "my-stack-data-bucket");

        let long = "x".repeat(100);
        assert_eq!(physical_name(&long, "Id", MAX_BUCKET_NAME_LEN).len(), 63);
        assert_eq!(physical_name("ab", "-", 63), "ab");
        assert_eq!(physical_name("-Stack", "Id", 63), "stack-id");
        assert_eq!(physical_name(".stack", "Id.", 63), "stack-id");
    }

    #[test]
    fn truncated_names_stay_distinct() {
        let stack = "A".repeat(70);
        let raw = physical_name(&stack, "Raw", MAX_BUCKET_NAME_LEN);
        let processed = physical_name(&stack, "Processed", MAX_BUCKET_NAME_LEN);

        assert_ne!(raw, processed);
        assert_eq!(raw, physical_name(&stack, "Raw", MAX_BUCKET_NAME_LEN));
        for name in [&raw, &processed] {
            assert!(name.len() <= MAX_BUCKET_NAME_LEN, "{name}");
            assert!(name.starts_with('a'), "{name}");
            assert!(!name.ends_with('-'), "{name}");
        }
        assert!(raw.contains("-raw-"), "{raw}");
        assert!(processed.contains("processed-"), "{processed}");
    }

    #[test]
    fn truncation_trims_leading_separators() {
        let stack = format!("--{}", "b".repeat(80));
        let name = physical_name(&stack, "Data", MAX_BUCKET_NAME_LEN);
        assert!(name.starts_with('b'), "{name}");
        assert!(name.len() <= MAX_BUCKET_NAME_LEN);
    }
}
