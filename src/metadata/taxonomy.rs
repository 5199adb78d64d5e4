//! Fixed grouping of metadata field names into report categories.
//!
//! Field names are `Group:Tag` as emitted by `exiftool -G`. The lists are
//! data, not logic: a field is printed when present, in list order, and a
//! name listed twice is printed twice.

/// One report category and the fields probed for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldCategory {
    pub name: &'static str,
    pub fields: &'static [&'static str],
}

pub static FIELD_TAXONOMY: &[FieldCategory] = &[
    FieldCategory {
        name: "names",
        fields: &[
            "XMP:Author",
            "XMP:Creator",
            "EXIF:Artist",
            "XMP:Source",
            "IPTC:Source",
            "EXIF:Copyright",
            "IPTC:CopyrightNotice",
            "IPTC:Credit",
            "XMP:Credit",
            "IPTC:Credit",
            "IPTC:Writer-Editor",
            "IPTC:By-line",
        ],
    },
    FieldCategory {
        name: "addresses",
        fields: &[
            "XMP:CreatorAddress",
            "XMP:CreatorCity",
            "XMP:CreatorCountry",
            "XMP:CreatorPostalCode",
            "XMP:CreatorRegion",
            "IPTC:City",
            "IPTC:Province-State",
            "IPTC:Country-PrimaryLocationName",
            "IPTC:Country-PrimaryLocationCode",
            "IPTC:Sub-location",
        ],
    },
    FieldCategory {
        name: "emails",
        fields: &["XMP:CreatorWorkEmail"],
    },
    FieldCategory {
        name: "phone",
        fields: &["XMP:CreatorWorkTelephone"],
    },
    FieldCategory {
        name: "urls",
        fields: &["XMP:CreatorWorkURL", "XMP:LicensorURL:", "XMP:WebStatement"],
    },
    FieldCategory {
        name: "dates",
        fields: &[
            "File:FileModifyDate",
            "File:FileAccessDate",
            "File:FileInodeChangeDate",
            "ICC_Profile:ProfileDateTime",
            "PNG:Datecreate",
            "PNG:Datemodify",
            "PNG:ModifyDate",
            "XMP:MetadataDate",
            "XMP:ModifyDate",
            "XMP:CreateDate",
            "IPTC:DateSent",
            "IPTC:TimeSent",
            "IPTC:DateCreated",
            "IPTC:TimeCreated",
        ],
    },
    FieldCategory {
        name: "platform",
        fields: &["XMP:HistorySoftwareAgent", "XMP:Platform"],
    },
    FieldCategory {
        name: "software",
        fields: &[
            "EXIF:Software",
            "XMP:CreatorTool",
            "XMP:HistorySoftwareAgent",
            "IPTC:OriginatingProgram",
        ],
    },
    FieldCategory {
        name: "misc/context",
        fields: &[
            "EXIF:ImageDescription",
            "XMP:Description",
            "EXIF:UserComment",
            "IPTC:ObjectName",
            "IPTC:Keywords",
            "IPTC:Headline",
            "IPTC:Caption-Abstract",
            "IPTC:SubjectReference",
            "IPTC:SupplementalCategories",
            "IPTC:SpecialInstructions",
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_in_report_order() {
        let names: Vec<&str> = FIELD_TAXONOMY.iter().map(|c| c.name).collect();
        assert_eq!(
            names,
            vec![
                "names",
                "addresses",
                "emails",
                "phone",
                "urls",
                "dates",
                "platform",
                "software",
                "misc/context"
            ]
        );
    }

    #[test]
    fn field_counts() {
        let counts: Vec<usize> = FIELD_TAXONOMY.iter().map(|c| c.fields.len()).collect();
        assert_eq!(counts, vec![12, 10, 1, 1, 3, 14, 2, 4, 10]);
    }
}
