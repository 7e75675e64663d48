//! RR type and class code registries. Both must carry unassigned code
//! points losslessly (RFC 3597), so they are built with `code_enum!` rather
//! than a closed derive: decoding never fails, and unknown codes print and
//! parse in the generic `TYPEnnn` / `CLASSnnn` form.
use crate::code_enum;

code_enum! {
    /// RR type codes: https://www.iana.org/assignments/dns-parameters/dns-parameters.xhtml#dns-parameters-4
    pub enum QType ("TYPE") {
        A = 1,            // a host address [RFC1035]
        NS = 2,           // an authoritative name server [RFC1035]
        CNAME = 5,        // the canonical name for an alias [RFC1035]
        SOA = 6,          // marks the start of a zone of authority [RFC1035]
        WKS = 11,         // a well known service description [RFC1035]
        PTR = 12,         // a domain name pointer [RFC1035]
        HINFO = 13,       // host information [RFC1035]
        MX = 15,          // mail exchange [RFC1035]
        TXT = 16,         // text strings [RFC1035]
        RP = 17,          // for Responsible Person [RFC1183]
        AFSDB = 18,       // for AFS Data Base location [RFC1183][RFC5864]
        X25 = 19,         // for X.25 PSDN address [RFC1183]
        ISDN = 20,        // for ISDN address [RFC1183]
        RT = 21,          // for Route Through [RFC1183]
        NSAP = 22,        // for NSAP address, NSAP style A record [RFC1706]
        SIG = 24,         // for security signature [RFC2536][RFC2931]
        KEY = 25,         // for security key [RFC2536][RFC2539]
        PX = 26,          // X.400 mail mapping information [RFC2163]
        GPOS = 27,        // Geographical Position [RFC1712]
        AAAA = 28,        // IP6 Address [RFC3596]
        LOC = 29,         // Location Information [RFC1876]
        SRV = 33,         // Server Selection [RFC2782]
        NAPTR = 35,       // Naming Authority Pointer [RFC3403]
        KX = 36,          // Key Exchanger [RFC2230]
        CERT = 37,        // CERT [RFC4398]
        DNAME = 39,       // DNAME [RFC6672]
        OPT = 41,         // OPT [RFC3225][RFC6891]
        APL = 42,         // APL [RFC3123]
        DS = 43,          // Delegation Signer [RFC4034]
        SSHFP = 44,       // SSH Key Fingerprint [RFC4255]
        IPSECKEY = 45,    // IPSECKEY [RFC4025]
        RRSIG = 46,       // RRSIG [RFC4034]
        NSEC = 47,        // NSEC [RFC4034][RFC9077]
        DNSKEY = 48,      // DNSKEY [RFC4034]
        DHCID = 49,       // DHCID [RFC4701]
        NSEC3 = 50,       // NSEC3 [RFC5155][RFC9077]
        NSEC3PARAM = 51,  // NSEC3PARAM [RFC5155]
        TLSA = 52,        // TLSA [RFC6698]
        SMIMEA = 53,      // S/MIME cert association [RFC8162]
        HIP = 55,         // Host Identity Protocol [RFC8005]
        CDS = 59,         // Child DS [RFC7344]
        CDNSKEY = 60,     // DNSKEY(s) the Child wants reflected in DS [RFC7344]
        OPENPGPKEY = 61,  // OpenPGP Key [RFC7929]
        CSYNC = 62,       // Child-To-Parent Synchronization [RFC7477]
        ZONEMD = 63,      // Message Digest Over Zone Data [RFC8976]
        SVCB = 64,        // Service Binding [RFC9460]
        HTTPS = 65,       // HTTPS Binding [RFC9460]
        SPF = 99,         // [RFC7208]
        NID = 104,        // [RFC6742]
        L32 = 105,        // [RFC6742]
        L64 = 106,        // [RFC6742]
        LP = 107,         // [RFC6742]
        EUI48 = 108,      // an EUI-48 address [RFC7043]
        EUI64 = 109,      // an EUI-64 address [RFC7043]
        TKEY = 249,       // Transaction Key [RFC2930]
        TSIG = 250,       // Transaction Signature [RFC8945]
        IXFR = 251,       // incremental transfer [RFC1995]
        AXFR = 252,       // transfer of an entire zone [RFC1035][RFC5936]
        ANY = 255,        // a request for some or all records [RFC8482]
        URI = 256,        // URI [RFC7553]
        CAA = 257,        // Certification Authority Restriction [RFC8659]
        AMTRELAY = 260,   // Automatic Multicast Tunneling Relay [RFC8777]
        DLV = 32769,      // DNSSEC Lookaside Validation (OBSOLETE) [RFC8749]
    }
}

code_enum! {
    /// RR class values: https://datatracker.ietf.org/doc/html/rfc1035#section-3.2.4
    pub enum QClass ("CLASS") {
        IN = 1,     // the Internet
        CS = 2,     // the CSNET class (obsolete)
        CH = 3,     // the CHAOS class
        HS = 4,     // Hesiod
        NONE = 254, // [RFC2136]
        ANY = 255,
    }
}
