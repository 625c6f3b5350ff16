//! Controlled vocabularies shared by the submission contexts

/// Sequencing platforms accepted for read submissions
pub const PLATFORMS: &[&str] = &[
    "ILLUMINA",
    "LS454",
    "ION_TORRENT",
    "PACBIO_SMRT",
    "OXFORD_NANOPORE",
    "BGISEQ",
    "DNBSEQ",
    "ELEMENT",
    "CAPILLARY",
];

/// Instrument model and the platform it belongs to.
///
/// `unspecified` maps to no platform: PLATFORM must then be given explicitly.
pub const INSTRUMENTS: &[(&str, Option<&str>)] = &[
    ("Illumina Genome Analyzer", Some("ILLUMINA")),
    ("Illumina Genome Analyzer II", Some("ILLUMINA")),
    ("Illumina Genome Analyzer IIx", Some("ILLUMINA")),
    ("Illumina HiSeq 1000", Some("ILLUMINA")),
    ("Illumina HiSeq 1500", Some("ILLUMINA")),
    ("Illumina HiSeq 2000", Some("ILLUMINA")),
    ("Illumina HiSeq 2500", Some("ILLUMINA")),
    ("Illumina HiSeq 3000", Some("ILLUMINA")),
    ("Illumina HiSeq 4000", Some("ILLUMINA")),
    ("Illumina HiSeq X", Some("ILLUMINA")),
    ("Illumina MiSeq", Some("ILLUMINA")),
    ("Illumina MiniSeq", Some("ILLUMINA")),
    ("Illumina NextSeq 500", Some("ILLUMINA")),
    ("Illumina NextSeq 1000", Some("ILLUMINA")),
    ("Illumina NextSeq 2000", Some("ILLUMINA")),
    ("Illumina NovaSeq 6000", Some("ILLUMINA")),
    ("Illumina NovaSeq X", Some("ILLUMINA")),
    ("Illumina iSeq 100", Some("ILLUMINA")),
    ("454 GS", Some("LS454")),
    ("454 GS 20", Some("LS454")),
    ("454 GS FLX", Some("LS454")),
    ("454 GS FLX Titanium", Some("LS454")),
    ("454 GS Junior", Some("LS454")),
    ("Ion Torrent PGM", Some("ION_TORRENT")),
    ("Ion Torrent Proton", Some("ION_TORRENT")),
    ("Ion Torrent S5", Some("ION_TORRENT")),
    ("Ion Torrent S5 XL", Some("ION_TORRENT")),
    ("PacBio RS", Some("PACBIO_SMRT")),
    ("PacBio RS II", Some("PACBIO_SMRT")),
    ("Sequel", Some("PACBIO_SMRT")),
    ("Sequel II", Some("PACBIO_SMRT")),
    ("Sequel IIe", Some("PACBIO_SMRT")),
    ("Revio", Some("PACBIO_SMRT")),
    ("MinION", Some("OXFORD_NANOPORE")),
    ("GridION", Some("OXFORD_NANOPORE")),
    ("PromethION", Some("OXFORD_NANOPORE")),
    ("BGISEQ-500", Some("BGISEQ")),
    ("DNBSEQ-G400", Some("DNBSEQ")),
    ("DNBSEQ-T7", Some("DNBSEQ")),
    ("Element AVITI", Some("ELEMENT")),
    ("AB 3730xL Genetic Analyzer", Some("CAPILLARY")),
    ("AB 3130xL Genetic Analyzer", Some("CAPILLARY")),
    ("unspecified", None),
];

pub const LIBRARY_SOURCES: &[&str] = &[
    "GENOMIC",
    "GENOMIC SINGLE CELL",
    "TRANSCRIPTOMIC",
    "TRANSCRIPTOMIC SINGLE CELL",
    "METAGENOMIC",
    "METATRANSCRIPTOMIC",
    "SYNTHETIC",
    "VIRAL RNA",
    "OTHER",
];

pub const LIBRARY_SELECTIONS: &[&str] = &[
    "RANDOM",
    "PCR",
    "RANDOM PCR",
    "RT-PCR",
    "HMPR",
    "MF",
    "repeat fractionation",
    "size fractionation",
    "MSLL",
    "cDNA",
    "cDNA_randomPriming",
    "cDNA_oligo_dT",
    "PolyA",
    "Oligo-dT",
    "Inverse rRNA",
    "Inverse rRNA selection",
    "ChIP",
    "ChIP-Seq",
    "MNase",
    "DNase",
    "Hybrid Selection",
    "Reduced Representation",
    "Restriction Digest",
    "5-methylcytidine antibody",
    "MBD2 protein methyl-CpG binding domain",
    "CAGE",
    "RACE",
    "MDA",
    "padlock probes capture method",
    "other",
    "unspecified",
];

pub const LIBRARY_STRATEGIES: &[&str] = &[
    "WGS",
    "WGA",
    "WXS",
    "RNA-Seq",
    "ssRNA-seq",
    "miRNA-Seq",
    "ncRNA-Seq",
    "FL-cDNA",
    "EST",
    "Hi-C",
    "ATAC-seq",
    "WCS",
    "RAD-Seq",
    "CLONE",
    "POOLCLONE",
    "AMPLICON",
    "CLONEEND",
    "FINISHING",
    "ChIP-Seq",
    "MNase-Seq",
    "DNase-Hypersensitivity",
    "Bisulfite-Seq",
    "CTS",
    "MRE-Seq",
    "MeDIP-Seq",
    "MBD-Seq",
    "Tn-Seq",
    "VALIDATION",
    "FAIRE-seq",
    "SELEX",
    "RIP-Seq",
    "ChIA-PET",
    "Synthetic-Long-Read",
    "Targeted-Capture",
    "Tethered Chromatin Conformation Capture",
    "OTHER",
];

pub const MOLECULE_TYPES: &[&str] = &["genomic DNA", "genomic RNA", "viral cRNA"];

pub const ASSEMBLY_TYPES: &[&str] = &[
    "clone or isolate",
    "primary metagenome",
    "binned metagenome",
    "Metagenome-Assembled Genome (MAG)",
    "Environmental Single-Cell Amplified Genome (SAG)",
    "COVID-19 outbreak",
];

pub const YES_NO: &[&str] = &["yes", "no"];

/// Instrument names, for the INSTRUMENT vocabulary
pub fn instrument_names() -> Vec<&'static str> {
    INSTRUMENTS.iter().map(|(name, _)| *name).collect()
}

/// Platform an instrument belongs to; `None` for unknown or unspecified instruments
pub fn platform_for_instrument(instrument: &str) -> Option<&'static str> {
    INSTRUMENTS
        .iter()
        .find(|(name, _)| *name == instrument)
        .and_then(|(_, platform)| *platform)
}
